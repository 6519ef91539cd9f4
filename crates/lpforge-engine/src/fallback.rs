use lpforge_contracts::events::EventWriter;
use tracing::{error, info, warn};

use crate::error::{CandidateFailure, DirectorError, GenerationFailure};

/// A value produced by one candidate, plus the candidates that failed before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub value: T,
    pub model: String,
    pub recovered: Vec<CandidateFailure>,
}

/// Tries `candidates` strictly in order and returns the first success.
///
/// Each candidate is attempted once. A failed attempt is recorded and the next
/// candidate starts only after it has completed; nothing runs concurrently and
/// there is no backoff. When the list is exhausted every recorded failure is
/// returned, in candidate order.
pub fn first_success<T, F>(
    sequence: &str,
    candidates: &[String],
    events: Option<&EventWriter>,
    mut attempt: F,
) -> Result<Outcome<T>, GenerationFailure>
where
    F: FnMut(&str) -> Result<T, DirectorError>,
{
    if let Some(events) = events {
        record(events.sequence_started(sequence, candidates));
    }

    let mut failures: Vec<CandidateFailure> = Vec::new();
    for (idx, model) in candidates.iter().enumerate() {
        info!(sequence, model = model.as_str(), attempt = idx + 1, "trying candidate model");
        match attempt(model) {
            Ok(value) => {
                if let Some(events) = events {
                    record(events.candidate_succeeded(sequence, model, idx + 1));
                }
                return Ok(Outcome {
                    value,
                    model: model.clone(),
                    recovered: failures,
                });
            }
            Err(err) => {
                let message = err.to_string();
                warn!(sequence, model = model.as_str(), error = %message, "candidate model failed");
                if let Some(events) = events {
                    record(events.candidate_failed(sequence, model, &message));
                }
                failures.push(CandidateFailure {
                    model: model.clone(),
                    message,
                });
            }
        }
    }

    error!(sequence, failures = failures.len(), "all candidate models failed");
    if let Some(events) = events {
        record(events.sequence_failed(sequence, failures.len()));
    }
    Err(GenerationFailure { failures })
}

fn record(result: anyhow::Result<serde_json::Value>) {
    if let Err(err) = result {
        warn!(error = %err, "failed to append sequence event");
    }
}
