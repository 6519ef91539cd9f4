use std::sync::Arc;

use lpforge_contracts::credential::CredentialHolder;
use lpforge_contracts::events::EventWriter;
use lpforge_contracts::models::{CandidateSelector, ModelRegistry};
use lpforge_contracts::outline::{outline_response_schema, OutlineRequest, OutlineResult};
use tracing::warn;

use crate::error::DirectorError;
use crate::fallback::{first_success, Outcome};
use crate::prompts::{outline_instruction, DEFAULT_LANGUAGE};
use crate::text::{error_chain_text, strip_code_fence, truncate_text};
use crate::transport::{ModelCall, ModelTransport};

const SEQUENCE: &str = "outline";
const ERROR_MAX_CHARS: usize = 600;

/// Structured generation client for landing-page outlines.
pub struct OutlineGenerator {
    transport: Arc<dyn ModelTransport>,
    selector: CandidateSelector,
    language: String,
    events: Option<EventWriter>,
}

impl OutlineGenerator {
    pub fn new(transport: Arc<dyn ModelTransport>) -> Self {
        Self {
            transport,
            selector: CandidateSelector::new(ModelRegistry::outline_defaults()),
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

    pub fn candidates(&self, request: &OutlineRequest) -> Vec<String> {
        self.selector
            .candidates(request.model_override.as_deref(), request.has_image())
    }

    pub fn generate(
        &self,
        credentials: &CredentialHolder,
        request: &OutlineRequest,
    ) -> Result<Outcome<OutlineResult>, DirectorError> {
        let credential = credentials.get().ok_or(DirectorError::CredentialMissing)?;
        let missing = request.form.missing_fields();
        if !missing.is_empty() {
            return Err(DirectorError::InvalidRequest(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        let instruction = outline_instruction(&request.form, &self.language, request.has_image());
        let schema = outline_response_schema();
        let candidates = self.candidates(request);

        let outcome = first_success(SEQUENCE, &candidates, self.events.as_ref(), |model| {
            let call = ModelCall {
                model,
                instruction: &instruction,
                image: request.ref_image.as_ref(),
                response_schema: Some(&schema),
            };
            let reply = self
                .transport
                .generate(credential, &call)
                .map_err(|err| DirectorError::Transport(error_chain_text(&err, ERROR_MAX_CHARS)))?;
            decode_outline(&reply)
        })?;

        let missing_prompts = outcome.value.sections_missing_image_prompt();
        if !missing_prompts.is_empty() {
            warn!(
                model = outcome.model.as_str(),
                sections = ?missing_prompts,
                "visual sections came back without an image prompt"
            );
        }
        Ok(outcome)
    }
}

/// Schema-valid decode of a reply into an outline.
pub fn decode_outline(reply: &str) -> Result<OutlineResult, DirectorError> {
    serde_json::from_str::<OutlineResult>(strip_code_fence(reply))
        .map_err(|err| DirectorError::Decode(truncate_text(&err.to_string(), ERROR_MAX_CHARS)))
}
