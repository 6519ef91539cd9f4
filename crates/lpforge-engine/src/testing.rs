use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use lpforge_contracts::credential::Credential;

use crate::extract::{FetchError, PageSource};
use crate::transport::{ModelCall, ModelTransport};

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub model: String,
    pub has_image: bool,
    pub has_schema: bool,
    pub instruction: String,
    pub key: String,
}

/// Replays scripted replies in order and records every call.
pub(crate) struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Result<String, String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl ModelTransport for ScriptedTransport {
    fn generate(&self, credential: &Credential, call: &ModelCall<'_>) -> Result<String> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: call.model.to_string(),
            has_image: call.image.is_some(),
            has_schema: call.response_schema.is_some(),
            instruction: call.instruction.to_string(),
            key: credential.expose().to_string(),
        });
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("no scripted reply")),
        }
    }
}

/// Serves fixed page text, or fails every fetch when `text` is `None`.
pub(crate) struct FixedPage {
    pub text: Option<String>,
    pub fetched: Mutex<Vec<String>>,
}

impl FixedPage {
    pub fn serving(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: Some(text.to_string()),
            fetched: Mutex::new(Vec::new()),
        })
    }

    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            text: None,
            fetched: Mutex::new(Vec::new()),
        })
    }
}

impl PageSource for FixedPage {
    fn extract(&self, url: &str) -> Result<String, FetchError> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.text.clone().ok_or_else(|| FetchError::Request {
            url: url.to_string(),
            message: "connection refused".to_string(),
        })
    }
}
