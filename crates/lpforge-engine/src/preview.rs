use reqwest::Url;

const PREVIEW_BASE: &str = "https://image.pollinations.ai/prompt/";
const PREVIEW_QUERY: &str = "width=800&height=450&nologo=true";

/// Third-party preview URL for an English image prompt, 800x450 without a logo.
///
/// Returns `None` for a blank prompt.
pub fn image_preview_url(prompt: &str) -> Option<String> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return None;
    }
    let mut url = Url::parse(PREVIEW_BASE).ok()?;
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .push(prompt);
    url.set_query(Some(PREVIEW_QUERY));
    Some(url.into())
}
