use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::image::InlineImage;

pub const DEFAULT_GOAL: &str = "purchase";
pub const DEFAULT_MOOD: &str = "professional";
pub const GOAL_CHOICES: &[&str] = &["purchase", "lead", "app_install", "webinar", "branding"];

/// Layout kinds a generated section may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Header,
    Hero,
    Features,
    Testimonials,
    Pricing,
    Faq,
    Cta,
    Footer,
    TextSection,
    ImageSection,
}

impl SectionKind {
    pub const ALL: [SectionKind; 10] = [
        SectionKind::Header,
        SectionKind::Hero,
        SectionKind::Features,
        SectionKind::Testimonials,
        SectionKind::Pricing,
        SectionKind::Faq,
        SectionKind::Cta,
        SectionKind::Footer,
        SectionKind::TextSection,
        SectionKind::ImageSection,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Header => "header",
            SectionKind::Hero => "hero",
            SectionKind::Features => "features",
            SectionKind::Testimonials => "testimonials",
            SectionKind::Pricing => "pricing",
            SectionKind::Faq => "faq",
            SectionKind::Cta => "cta",
            SectionKind::Footer => "footer",
            SectionKind::TextSection => "text_section",
            SectionKind::ImageSection => "image_section",
        }
    }

    /// Sections that are expected to carry an `imagePrompt`.
    pub fn is_visual(self) -> bool {
        matches!(
            self,
            SectionKind::Hero | SectionKind::Features | SectionKind::ImageSection
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(rename = "type")]
    pub kind: SectionKind,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<SectionStyle>,
}

impl Section {
    pub fn image_prompt(&self) -> Option<&str> {
        self.image_prompt
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn layout(&self) -> Option<&str> {
        self.style
            .as_ref()
            .and_then(|style| style.layout.as_deref())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineMeta {
    pub title: String,
    pub description: String,
}

/// A landing-page outline as returned by the model. Never mutated after decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineResult {
    pub meta: OutlineMeta,
    pub sections: Vec<Section>,
}

impl OutlineResult {
    /// Visual sections that came back without an image prompt.
    pub fn sections_missing_image_prompt(&self) -> Vec<usize> {
        self.sections
            .iter()
            .enumerate()
            .filter(|(_, section)| section.kind.is_visual() && section.image_prompt().is_none())
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// Raw form input for the outline generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineForm {
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub usp: String,
    #[serde(default = "default_goal")]
    pub goal: String,
    #[serde(default = "default_mood")]
    pub mood: String,
    #[serde(default)]
    pub other_notes: String,
    #[serde(default)]
    pub model_id: Option<String>,
}

impl Default for OutlineForm {
    fn default() -> Self {
        Self {
            product_name: String::new(),
            target_audience: String::new(),
            usp: String::new(),
            goal: default_goal(),
            mood: default_mood(),
            other_notes: String::new(),
            model_id: None,
        }
    }
}

impl OutlineForm {
    /// Names of required fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        for (name, value) in [
            ("productName", &self.product_name),
            ("targetAudience", &self.target_audience),
            ("usp", &self.usp),
            ("goal", &self.goal),
            ("mood", &self.mood),
        ] {
            if value.trim().is_empty() {
                missing.push(name);
            }
        }
        missing
    }

    pub fn into_request(self, ref_image: Option<InlineImage>) -> OutlineRequest {
        let model_override = self
            .model_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        OutlineRequest {
            form: OutlineForm {
                model_id: None,
                ..self
            },
            ref_image,
            model_override,
        }
    }
}

/// One outline submission: subject fields, optional reference image and
/// optional model override. Built per submission and dropped afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineRequest {
    pub form: OutlineForm,
    pub ref_image: Option<InlineImage>,
    pub model_override: Option<String>,
}

impl OutlineRequest {
    pub fn has_image(&self) -> bool {
        self.ref_image.is_some()
    }
}

fn default_goal() -> String {
    DEFAULT_GOAL.to_string()
}

fn default_mood() -> String {
    DEFAULT_MOOD.to_string()
}

/// Response schema handed to the provider for schema-constrained output.
pub fn outline_response_schema() -> Value {
    let kinds: Vec<&str> = SectionKind::ALL.iter().map(|kind| kind.as_str()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "meta": {
                "type": "OBJECT",
                "properties": {
                    "title": { "type": "STRING" },
                    "description": { "type": "STRING" }
                },
                "required": ["title", "description"]
            },
            "sections": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "type": { "type": "STRING", "enum": kinds },
                        "title": { "type": "STRING" },
                        "content": {
                            "type": "STRING",
                            "description": "Main text content for this section"
                        },
                        "imagePrompt": {
                            "type": "STRING",
                            "description": "Prompt for generating an image for this section, if applicable"
                        },
                        "style": {
                            "type": "OBJECT",
                            "properties": {
                                "backgroundColor": { "type": "STRING" },
                                "textColor": { "type": "STRING" },
                                "layout": { "type": "STRING" }
                            }
                        }
                    },
                    "required": ["type", "title", "content"]
                }
            }
        },
        "required": ["meta", "sections"]
    })
}
