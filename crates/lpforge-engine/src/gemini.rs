use std::env;

use anyhow::{bail, Context, Result};
use lpforge_contracts::credential::Credential;
use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::text::truncate_text;
use crate::transport::{ModelCall, ModelTransport};

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Google Gemini over the public REST API.
///
/// The key travels in the `x-goog-api-key` header so it never appears in a
/// URL, and therefore never in a transport error message.
pub struct GeminiTransport {
    api_base: String,
    http: HttpClient,
}

/// A row of the model-listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedModel {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ListedModel {
    /// Name as accepted by `generateContent`, without the `models/` prefix.
    pub fn short_name(&self) -> &str {
        self.name.strip_prefix("models/").unwrap_or(&self.name)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ModelListPage {
    #[serde(default)]
    models: Vec<ListedModel>,
    #[serde(default, rename = "nextPageToken")]
    next_page_token: Option<String>,
}

impl GeminiTransport {
    /// Uses `GEMINI_API_BASE` when set.
    pub fn new() -> Self {
        let api_base = env::var("GEMINI_API_BASE")
            .ok()
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string());
        Self::with_api_base(api_base)
    }

    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            http: HttpClient::new(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint_for_model(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    fn build_payload(call: &ModelCall<'_>) -> Value {
        let mut parts = vec![json!({ "text": call.instruction })];
        if let Some(image) = call.image {
            parts.push(json!({
                "inlineData": {
                    "mimeType": image.mime_type(),
                    "data": image.to_base64(),
                }
            }));
        }

        let mut payload = json!({
            "contents": [{
                "role": "user",
                "parts": parts,
            }],
        });
        if let Some(schema) = call.response_schema {
            payload["generationConfig"] = json!({
                "responseMimeType": "application/json",
                "responseSchema": schema,
            });
        }
        payload
    }

    fn extract_reply_text(payload: &Value) -> Result<String> {
        let candidate = payload
            .get("candidates")
            .and_then(Value::as_array)
            .and_then(|rows| rows.first());
        let text = candidate
            .and_then(|row| row.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part.get("text").and_then(Value::as_str))
                    .collect::<String>()
            })
            .unwrap_or_default();
        if !text.trim().is_empty() {
            return Ok(text);
        }

        if let Some(reason) = payload
            .get("promptFeedback")
            .and_then(|feedback| feedback.get("blockReason"))
            .and_then(Value::as_str)
        {
            bail!("Gemini blocked the prompt ({reason})");
        }
        if let Some(reason) = candidate
            .and_then(|row| row.get("finishReason"))
            .and_then(Value::as_str)
        {
            bail!("Gemini returned no text (finish reason {reason})");
        }
        bail!("Gemini returned no text")
    }

    /// Lists every model the key can see, following pagination.
    pub fn list_models(&self, credential: &Credential) -> Result<Vec<ListedModel>> {
        let endpoint = format!("{}/models", self.api_base);
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self
                .http
                .get(&endpoint)
                .header(API_KEY_HEADER, credential.expose());
            if let Some(token) = page_token.as_deref() {
                request = request.query(&[("pageToken", token)]);
            }
            let response = request
                .send()
                .map_err(reqwest::Error::without_url)
                .with_context(|| format!("Gemini model listing failed ({endpoint})"))?;
            let payload = response_json_or_error("Gemini", response)?;
            let page: ModelListPage = serde_json::from_value(payload)
                .context("Gemini model listing had an unexpected shape")?;
            models.extend(page.models);
            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(models)
    }
}

impl Default for GeminiTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelTransport for GeminiTransport {
    fn generate(&self, credential: &Credential, call: &ModelCall<'_>) -> Result<String> {
        let endpoint = self.endpoint_for_model(call.model);
        let payload = Self::build_payload(call);
        let response = self
            .http
            .post(&endpoint)
            .header(API_KEY_HEADER, credential.expose())
            .json(&payload)
            .send()
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Gemini request failed ({endpoint})"))?;
        let response_payload = response_json_or_error("Gemini", response)?;
        Self::extract_reply_text(&response_payload)
    }
}

fn response_json_or_error(provider: &str, response: HttpResponse) -> Result<Value> {
    let status = response.status();
    let code = status.as_u16();
    let body = response
        .text()
        .with_context(|| format!("{provider} response body read failed"))?;
    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|parsed| {
                parsed
                    .get("error")
                    .and_then(|error| error.get("message"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or(body);
        bail!(
            "{provider} request failed ({code}): {}",
            truncate_text(message.trim(), 512)
        );
    }
    let parsed: Value = serde_json::from_str(&body)
        .with_context(|| format!("{provider} returned invalid JSON payload"))?;
    Ok(parsed)
}
