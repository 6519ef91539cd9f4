use serde::{Deserialize, Serialize};

use crate::image::InlineImage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageAnalysis {
    pub design_impression: String,
    pub target_audience: String,
    pub structure_summary: String,
    pub price_strategy: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swot {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
    pub threats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreeC {
    pub customer: String,
    pub competitor: String,
    pub company: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyVariant {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSuggestion {
    pub description: String,
    #[serde(alias = "keywords")]
    pub search_keywords: String,
}

/// Creative brief for an existing landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefResult {
    pub analysis: PageAnalysis,
    pub swot: Swot,
    pub three_c: ThreeC,
    pub copies: Vec<CopyVariant>,
    pub image_suggestion: ImageSuggestion,
    pub banner_prompt: String,
    pub rationale: String,
}

/// Copy variants the instruction asks for, in order.
pub const COPY_KINDS: &[&str] = &["Benefit", "Empathy", "Urgency", "Creative", "Impact"];

/// What the analyzer looks at: a live page or a screenshot, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisTarget {
    Url(String),
    Image(InlineImage),
}

impl AnalysisTarget {
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisTarget::Url(_) => "url",
            AnalysisTarget::Image(_) => "image",
        }
    }
}

/// Analyzer form input as posted by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerForm {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_base64: Option<String>,
}
