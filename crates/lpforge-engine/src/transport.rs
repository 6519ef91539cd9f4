use anyhow::Result;
use lpforge_contracts::credential::Credential;
use lpforge_contracts::image::InlineImage;
use serde_json::Value;

/// One generation call against one candidate model.
#[derive(Debug, Clone, Copy)]
pub struct ModelCall<'a> {
    pub model: &'a str,
    pub instruction: &'a str,
    pub image: Option<&'a InlineImage>,
    /// When set, the provider must return JSON conforming to this schema.
    pub response_schema: Option<&'a Value>,
}

/// A model provider. Returns the raw reply text of a single call.
pub trait ModelTransport: Send + Sync {
    fn generate(&self, credential: &Credential, call: &ModelCall<'_>) -> Result<String>;
}
