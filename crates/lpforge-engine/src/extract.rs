use reqwest::blocking::Client as HttpClient;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, info};

use crate::text::cut_chars;

/// Upper bound on extracted page text, in characters.
pub const MAX_PAGE_CHARS: usize = 20_000;

const STRIPPED_ELEMENTS: &[&str] = &["script", "style", "nav", "footer"];

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("failed to fetch {url}: {message}")]
    Request { url: String, message: String },
    #[error("failed to fetch {url}: HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Anything that can turn a URL into analyzable page text.
pub trait PageSource: Send + Sync {
    fn extract(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetches a page and reduces it to its visible body text.
pub struct ContentExtractor {
    http: HttpClient,
    max_chars: usize,
}

impl ContentExtractor {
    pub fn new() -> Self {
        Self {
            http: HttpClient::new(),
            max_chars: MAX_PAGE_CHARS,
        }
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSource for ContentExtractor {
    fn extract(&self, url: &str) -> Result<String, FetchError> {
        let trimmed = url.trim();
        let parsed = Url::parse(trimmed).map_err(|err| FetchError::InvalidUrl {
            url: trimmed.to_string(),
            message: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: trimmed.to_string(),
                message: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let response = self
            .http
            .get(parsed)
            .send()
            .map_err(|err| FetchError::Request {
                url: trimmed.to_string(),
                message: err.without_url().to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: trimmed.to_string(),
                status: status.as_u16(),
            });
        }
        let html = response.text().map_err(|err| FetchError::Request {
            url: trimmed.to_string(),
            message: err.without_url().to_string(),
        })?;
        debug!(url = trimmed, bytes = html.len(), "fetched page markup");

        let text = visible_text(&html, self.max_chars);
        info!(url = trimmed, chars = text.chars().count(), "extracted page text");
        Ok(text)
    }
}

/// Body text with script/style/nav/footer removed, whitespace collapsed and a
/// hard character cap.
pub fn visible_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();
    if let Ok(selector) = Selector::parse("body") {
        for body in document.select(&selector) {
            collect_text(body, &mut raw);
        }
    }
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    cut_chars(&collapsed, max_chars)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            if STRIPPED_ELEMENTS.contains(&child_element.value().name()) {
                continue;
            }
            collect_text(child_element, out);
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{visible_text, ContentExtractor, FetchError, PageSource, MAX_PAGE_CHARS};

    const PAGE: &str = r#"<!doctype html>
<html>
  <head><title>Acme</title><style>body { color: red; }</style></head>
  <body>
    <nav><a href="/">Home</a> <a href="/pricing">Pricing</a></nav>
    <h1>Reports   in
        one click</h1>
    <script>window.secret = "tracking";</script>
    <p>Built for	small business owners.</p>
    <style>.hero { display: none; }</style>
    <div><span>Start</span> <span>today</span></div>
    <footer>Copyright Acme <script>year()</script></footer>
  </body>
</html>"#;

    #[test]
    fn strips_non_content_elements_and_collapses_whitespace() {
        let text = visible_text(PAGE, MAX_PAGE_CHARS);
        assert_eq!(
            text,
            "Reports in one click Built for small business owners. Start today"
        );
        for hidden in ["Home", "Pricing", "tracking", "display", "Copyright", "year()"] {
            assert!(!text.contains(hidden), "{hidden} leaked into {text}");
        }
    }

    #[test]
    fn output_is_capped() {
        let body = "word ".repeat(10_000);
        let html = format!("<html><body><p>{body}</p></body></html>");
        let text = visible_text(&html, MAX_PAGE_CHARS);
        assert_eq!(text.chars().count(), MAX_PAGE_CHARS);
        assert!(visible_text(&html, 7).chars().count() <= 7);
    }

    #[test]
    fn page_without_body_text_is_empty() {
        assert_eq!(visible_text("<script>only()</script>", MAX_PAGE_CHARS), "");
    }

    #[test]
    fn unreachable_url_is_a_fetch_error() {
        let err = ContentExtractor::new()
            .extract("http://127.0.0.1:1/landing")
            .unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }), "got {err:?}");
    }

    #[test]
    fn malformed_url_is_rejected_before_fetching() {
        let err = ContentExtractor::new().extract("not a url").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
        let err = ContentExtractor::new()
            .extract("ftp://example.com/file")
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }
}
