pub mod brief;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod gemini;
pub mod outline;
pub mod preview;
pub mod prompts;
pub mod transport;

mod text;

#[cfg(test)]
mod testing;

pub use brief::{decode_brief, BriefAnalyzer};
pub use error::{CandidateFailure, DirectorError, GenerationFailure};
pub use extract::{ContentExtractor, FetchError, PageSource, MAX_PAGE_CHARS};
pub use fallback::{first_success, Outcome};
pub use gemini::{GeminiTransport, ListedModel, DEFAULT_GEMINI_API_BASE};
pub use outline::{decode_outline, OutlineGenerator};
pub use preview::image_preview_url;
pub use prompts::DEFAULT_LANGUAGE;
pub use transport::{ModelCall, ModelTransport};

/// Fresh identifier for one run's event stream.
pub fn new_run_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
