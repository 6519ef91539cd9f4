use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};

pub type EventPayload = Map<String, Value>;

/// Append-only JSONL log of request sequences.
///
/// Every line carries `type`, `run_id` and `ts`; the caller payload is merged
/// on top. Payloads hold model names and error messages only, never the
/// credential.
#[derive(Debug, Clone)]
pub struct EventWriter {
    inner: Arc<EventWriterInner>,
}

#[derive(Debug)]
struct EventWriterInner {
    path: PathBuf,
    run_id: String,
    lock: Mutex<()>,
}

impl EventWriter {
    pub fn new(path: impl Into<PathBuf>, run_id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(EventWriterInner {
                path: path.into(),
                run_id: run_id.into(),
                lock: Mutex::new(()),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn run_id(&self) -> &str {
        &self.inner.run_id
    }

    pub fn sequence_started(&self, sequence: &str, candidates: &[String]) -> anyhow::Result<Value> {
        self.emit(
            "sequence_started",
            object(json!({
                "sequence": sequence,
                "candidates": candidates,
            })),
        )
    }

    pub fn candidate_failed(
        &self,
        sequence: &str,
        model: &str,
        message: &str,
    ) -> anyhow::Result<Value> {
        self.emit(
            "candidate_failed",
            object(json!({
                "sequence": sequence,
                "model": model,
                "error": message,
            })),
        )
    }

    pub fn candidate_succeeded(
        &self,
        sequence: &str,
        model: &str,
        attempts: usize,
    ) -> anyhow::Result<Value> {
        self.emit(
            "candidate_succeeded",
            object(json!({
                "sequence": sequence,
                "model": model,
                "attempts": attempts,
            })),
        )
    }

    pub fn sequence_failed(&self, sequence: &str, failures: usize) -> anyhow::Result<Value> {
        self.emit(
            "sequence_failed",
            object(json!({
                "sequence": sequence,
                "failures": failures,
            })),
        )
    }

    pub fn emit(&self, event_type: &str, payload: EventPayload) -> anyhow::Result<Value> {
        let mut event = Map::new();
        event.insert("type".to_string(), Value::String(event_type.to_string()));
        event.insert(
            "run_id".to_string(),
            Value::String(self.inner.run_id.clone()),
        );
        event.insert("ts".to_string(), Value::String(now_utc_iso()));
        event.extend(payload);

        if let Some(parent) = self.inner.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let line = serde_json::to_string(&event)?;
        let _guard = self
            .inner
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("event writer lock poisoned"))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.inner.path)?;
        writeln!(file, "{line}")?;

        Ok(Value::Object(event))
    }
}

fn object(value: Value) -> EventPayload {
    match value {
        Value::Object(map) => map,
        _ => EventPayload::new(),
    }
}

fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
