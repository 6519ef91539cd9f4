use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use thiserror::Error;

/// Reference images above this size are rejected before any network call.
pub const MAX_IMAGE_BYTES: usize = 4 * 1024 * 1024;

const DEFAULT_IMAGE_MIME: &str = "image/png";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("image is {size} bytes; the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },
    #[error("image is empty")]
    Empty,
    #[error("image data is not valid base64: {0}")]
    InvalidBase64(String),
}

/// Raw image bytes plus the mime type they are declared as.
///
/// Construction enforces [`MAX_IMAGE_BYTES`], so holding an `InlineImage`
/// means the payload is small enough to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    bytes: Vec<u8>,
    mime_type: String,
}

impl InlineImage {
    pub fn new(bytes: Vec<u8>, mime_type: Option<&str>) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageError::TooLarge {
                size: bytes.len(),
                limit: MAX_IMAGE_BYTES,
            });
        }
        let mime_type = mime_type
            .map(str::trim)
            .filter(|value| value.starts_with("image/"))
            .map(str::to_string)
            .unwrap_or_else(|| sniff_mime(&bytes).to_string());
        Ok(Self { bytes, mime_type })
    }

    /// Accepts either a `data:image/...;base64,` URL or bare base64.
    pub fn from_base64(raw: &str) -> Result<Self, ImageError> {
        let raw = raw.trim();
        let (declared_mime, payload) = match raw.strip_prefix("data:") {
            Some(rest) => match rest.split_once(',') {
                Some((header, data)) => (
                    header
                        .split(';')
                        .next()
                        .filter(|value| !value.is_empty()),
                    data,
                ),
                None => (None, rest),
            },
            None => (None, raw),
        };
        // Reject on the encoded length before decoding.
        let estimated = payload.len() / 4 * 3;
        if estimated > MAX_IMAGE_BYTES + 3 {
            return Err(ImageError::TooLarge {
                size: estimated,
                limit: MAX_IMAGE_BYTES,
            });
        }
        let bytes = BASE64
            .decode(payload.trim().as_bytes())
            .map_err(|err| ImageError::InvalidBase64(err.to_string()))?;
        Self::new(bytes, declared_mime)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }
}

fn sniff_mime(bytes: &[u8]) -> &'static str {
    ::image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or(DEFAULT_IMAGE_MIME)
}
