use super::registry::{ModelRegistry, CAPABILITY_VISION};

/// Builds the ordered candidate list for one request sequence.
///
/// Order:
/// - the explicit override, if any
/// - every vision-capable model, in registry order
/// - text-only models, only when no image is attached
///
/// A name appears at most once.
#[derive(Debug, Clone)]
pub struct CandidateSelector {
    pub registry: ModelRegistry,
}

impl CandidateSelector {
    pub fn new(registry: ModelRegistry) -> Self {
        Self { registry }
    }

    pub fn candidates(&self, requested: Option<&str>, has_image: bool) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            if !out.iter().any(|existing| existing == name) {
                out.push(name.to_string());
            }
        };

        if let Some(requested) = requested.map(str::trim).filter(|value| !value.is_empty()) {
            push(requested);
        }
        for model in self.registry.by_capability(CAPABILITY_VISION) {
            push(&model.name);
        }
        if !has_image {
            for model in self.registry.without_capability(CAPABILITY_VISION) {
                push(&model.name);
            }
        }
        out
    }
}
