use indexmap::IndexMap;

pub const CAPABILITY_TEXT: &str = "text";
pub const CAPABILITY_VISION: &str = "vision";

const MULTIMODAL: &[&str] = &[CAPABILITY_TEXT, CAPABILITY_VISION];
const TEXT_ONLY: &[&str] = &[CAPABILITY_TEXT];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: String,
    pub provider: String,
    pub capabilities: Vec<String>,
}

impl ModelSpec {
    pub fn supports(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|item| item == capability)
    }
}

/// Ordered set of known models. Insertion order is preference order.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelSpec>,
}

impl ModelRegistry {
    pub fn new(models: IndexMap<String, ModelSpec>) -> Self {
        Self { models }
    }

    /// Models tried for landing-page outlines, most preferred first.
    pub fn outline_defaults() -> Self {
        Self::new(default_models(&[
            ("gemini-2.0-flash-exp", MULTIMODAL),
            ("gemini-1.5-flash-latest", MULTIMODAL),
            ("gemini-1.5-flash-001", MULTIMODAL),
            ("gemini-1.5-flash-002", MULTIMODAL),
            ("gemini-1.5-pro-latest", MULTIMODAL),
            ("gemini-1.5-pro-001", MULTIMODAL),
            ("gemini-pro", TEXT_ONLY),
        ]))
    }

    /// Models tried for creative-brief analysis.
    pub fn brief_defaults() -> Self {
        Self::new(default_models(&[("gemini-2.5-flash", MULTIMODAL)]))
    }

    pub fn get(&self, name: &str) -> Option<&ModelSpec> {
        self.models.get(name)
    }

    pub fn list(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.values()
    }

    pub fn by_capability(&self, capability: &str) -> Vec<ModelSpec> {
        self.models
            .values()
            .filter(|model| model.supports(capability))
            .cloned()
            .collect()
    }

    pub fn without_capability(&self, capability: &str) -> Vec<ModelSpec> {
        self.models
            .values()
            .filter(|model| !model.supports(capability))
            .cloned()
            .collect()
    }
}

fn default_models(rows: &[(&str, &[&str])]) -> IndexMap<String, ModelSpec> {
    let mut map = IndexMap::new();
    for (name, capabilities) in rows {
        map.insert(
            name.to_string(),
            ModelSpec {
                name: name.to_string(),
                provider: "gemini".to_string(),
                capabilities: capabilities
                    .iter()
                    .map(|item| (*item).to_string())
                    .collect(),
            },
        );
    }
    map
}
