use std::sync::Arc;

use lpforge_contracts::brief::{AnalysisTarget, BriefResult};
use lpforge_contracts::credential::CredentialHolder;
use lpforge_contracts::events::EventWriter;
use lpforge_contracts::image::InlineImage;
use lpforge_contracts::models::{CandidateSelector, ModelRegistry};
use serde_json::Value;
use tracing::info;

use crate::error::DirectorError;
use crate::extract::PageSource;
use crate::fallback::{first_success, Outcome};
use crate::prompts::{brief_instruction, DEFAULT_LANGUAGE};
use crate::text::{error_chain_text, strip_code_fence, truncate_text};
use crate::transport::{ModelCall, ModelTransport};

const SEQUENCE: &str = "brief";
const ERROR_MAX_CHARS: usize = 600;

/// Creative-director analysis of an existing landing page.
///
/// A URL target is extracted to text first; an extraction failure ends the
/// request before any model is called. An image target is sent inline.
pub struct BriefAnalyzer {
    transport: Arc<dyn ModelTransport>,
    pages: Arc<dyn PageSource>,
    selector: CandidateSelector,
    language: String,
    events: Option<EventWriter>,
}

impl BriefAnalyzer {
    pub fn new(transport: Arc<dyn ModelTransport>, pages: Arc<dyn PageSource>) -> Self {
        Self {
            transport,
            pages,
            selector: CandidateSelector::new(ModelRegistry::brief_defaults()),
            language: DEFAULT_LANGUAGE.to_string(),
            events: None,
        }
    }

    pub fn with_registry(mut self, registry: ModelRegistry) -> Self {
        self.selector = CandidateSelector::new(registry);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_events(mut self, events: Option<EventWriter>) -> Self {
        self.events = events;
        self
    }

    pub fn analyze(
        &self,
        credentials: &CredentialHolder,
        target: &AnalysisTarget,
    ) -> Result<Outcome<BriefResult>, DirectorError> {
        let credential = credentials.get().ok_or(DirectorError::CredentialMissing)?;

        let (page_text, image): (Option<String>, Option<&InlineImage>) = match target {
            AnalysisTarget::Url(url) => {
                if url.trim().is_empty() {
                    return Err(DirectorError::InvalidRequest(
                        "URL or Image is required".to_string(),
                    ));
                }
                (Some(self.pages.extract(url)?), None)
            }
            AnalysisTarget::Image(image) => (None, Some(image)),
        };
        info!(input = target.label(), "analyzing landing page");

        let instruction = brief_instruction(page_text.as_deref(), &self.language);
        let candidates = self.selector.candidates(None, image.is_some());

        let outcome = first_success(SEQUENCE, &candidates, self.events.as_ref(), |model| {
            let call = ModelCall {
                model,
                instruction: &instruction,
                image,
                response_schema: None,
            };
            let reply = self
                .transport
                .generate(credential, &call)
                .map_err(|err| DirectorError::Transport(error_chain_text(&err, ERROR_MAX_CHARS)))?;
            decode_brief(&reply)
        })?;
        Ok(outcome)
    }
}

/// Strips a code fence, requires a JSON object and decodes it as a brief.
pub fn decode_brief(reply: &str) -> Result<BriefResult, DirectorError> {
    let value: Value = serde_json::from_str(strip_code_fence(reply))
        .map_err(|err| DirectorError::Decode(truncate_text(&err.to_string(), ERROR_MAX_CHARS)))?;
    if !value.is_object() {
        return Err(DirectorError::Decode("expected a JSON object".to_string()));
    }
    serde_json::from_value(value)
        .map_err(|err| DirectorError::Decode(truncate_text(&err.to_string(), ERROR_MAX_CHARS)))
}
