//! Gemini API gateway (Generative Language API, `generateContent`).

use std::time::Duration;

use anyhow::Context as _;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{Value, json};

use crate::{
    config::GatewaySettings,
    foundation::core::BoundingBox,
    foundation::error::{FrameError, FrameResult},
    gateway::{AiGateway, EnhancedImage},
};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_DETECT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENHANCE_MODEL: &str = "gemini-2.5-flash-image";

const USER_AGENT: &str = concat!("gameframe/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const DETECT_PROMPT: &str = "Detect the main human face in this image. Respond ONLY with a JSON \
object that strictly adheres to the provided schema. The object must contain the normalized \
bounding box coordinates with keys \"x\", \"y\", \"width\", and \"height\". All values must be \
numbers between 0.0 and 1.0, representing the position relative to the image's dimensions. If \
no face is clearly visible, return a JSON object with all four values set to 0.";

/// Resolved Gemini connection settings.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub detect_model: String,
    pub enhance_model: String,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("detect_model", &self.detect_model)
            .field("enhance_model", &self.enhance_model)
            .finish()
    }
}

impl GeminiConfig {
    /// Resolve from settings and the process environment.
    ///
    /// API key order: `settings.api_key`, `GEMINI_API_KEY`, `API_KEY`.
    /// Base URL order: `settings.base_url`, `GEMINI_BASE_URL`, [`DEFAULT_BASE_URL`].
    pub fn from_env(settings: &GatewaySettings) -> FrameResult<Self> {
        Self::resolve(settings, |name| std::env::var(name).ok())
    }

    pub fn resolve(
        settings: &GatewaySettings,
        env: impl Fn(&str) -> Option<String>,
    ) -> FrameResult<Self> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let api_key = non_empty(settings.api_key.clone())
            .or_else(|| non_empty(env("GEMINI_API_KEY")))
            .or_else(|| non_empty(env("API_KEY")))
            .ok_or_else(|| {
                FrameError::config("no Gemini API key: set GEMINI_API_KEY or gateway.api_key")
            })?
            .trim()
            .to_string();
        if HeaderValue::from_str(&api_key).is_err() {
            return Err(FrameError::config(
                "Gemini API key contains characters not allowed in an HTTP header",
            ));
        }

        let base_url = non_empty(settings.base_url.clone())
            .or_else(|| non_empty(env("GEMINI_BASE_URL")))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(FrameError::config(format!(
                "invalid Gemini base URL '{base_url}'"
            )));
        }

        Ok(Self {
            api_key,
            base_url,
            detect_model: settings.detect_model.clone(),
            enhance_model: settings.enhance_model.clone(),
        })
    }
}

/// Gemini-backed [`AiGateway`].
pub struct GeminiGateway {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiGateway {
    pub fn new(config: GeminiConfig) -> FrameResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("build http client")?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    async fn generate_content(&self, model: &str, request: &Value) -> anyhow::Result<Value> {
        let url = format!("{}/models/{}:generateContent", self.config.base_url, model);
        let response = self
            .http
            .post(&url)
            .headers(build_headers(&self.config.api_key)?)
            .json(request)
            .send()
            .await
            .with_context(|| format!("POST {model}:generateContent"))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("Gemini returned HTTP {}: {}", status.as_u16(), truncate(&body, 512));
        }

        serde_json::from_str(&body).context("parse Gemini response JSON")
    }
}

impl AiGateway for GeminiGateway {
    async fn detect_face(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> FrameResult<Option<BoundingBox>> {
        let request = build_detect_request(image, mime_type);
        let response = self
            .generate_content(&self.config.detect_model, &request)
            .await
            .map_err(|e| FrameError::detection(format!("{e:#}")))?;
        let bbox = parse_detect_response(&response);
        tracing::debug!(?bbox, "face detection answered");
        Ok(bbox)
    }

    async fn enhance(
        &self,
        image: &[u8],
        mime_type: &str,
        instruction: &str,
    ) -> FrameResult<EnhancedImage> {
        let request = build_enhance_request(image, mime_type, instruction);
        let response = self
            .generate_content(&self.config.enhance_model, &request)
            .await
            .map_err(|e| FrameError::enhancement(format!("{e:#}")))?;
        parse_enhance_response(&response, mime_type)
    }
}

fn inline_image_part(image: &[u8], mime_type: &str) -> Value {
    json!({
        "inlineData": {
            "mimeType": mime_type,
            "data": base64::engine::general_purpose::STANDARD.encode(image),
        }
    })
}

pub(crate) fn build_detect_request(image: &[u8], mime_type: &str) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [
                inline_image_part(image, mime_type),
                { "text": DETECT_PROMPT },
            ]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "x": { "type": "NUMBER" },
                    "y": { "type": "NUMBER" },
                    "width": { "type": "NUMBER" },
                    "height": { "type": "NUMBER" },
                },
                "required": ["x", "y", "width", "height"],
            }
        }
    })
}

pub(crate) fn build_enhance_request(image: &[u8], mime_type: &str, instruction: &str) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [
                inline_image_part(image, mime_type),
                { "text": instruction },
            ]
        }],
        "generationConfig": {
            "responseModalities": ["IMAGE"]
        }
    })
}

fn response_parts(value: &Value) -> Vec<Value> {
    let payload = value.get("response").unwrap_or(value);
    payload
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|c| c.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Extract the bounding box from a detection answer.
///
/// Empty text, unparseable JSON and the all-zero box all mean "no face".
pub(crate) fn parse_detect_response(value: &Value) -> Option<BoundingBox> {
    #[derive(serde::Deserialize)]
    struct RawBox {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    }

    let text: String = response_parts(value)
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    let text = strip_code_fence(text.trim());
    if text.is_empty() {
        tracing::warn!("face detection returned an empty response");
        return None;
    }

    let raw: RawBox = match serde_json::from_str(text) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(%err, "face detection returned malformed JSON");
            return None;
        }
    };
    let bbox = BoundingBox::new(raw.x, raw.y, raw.width, raw.height);
    if bbox.is_none() {
        tracing::warn!("no face detected");
    }
    bbox
}

pub(crate) fn parse_enhance_response(value: &Value, fallback_mime: &str) -> FrameResult<EnhancedImage> {
    for part in response_parts(value) {
        let Some(inline) = part.get("inlineData").or_else(|| part.get("inline_data")) else {
            continue;
        };
        let mime_type = inline
            .get("mimeType")
            .or_else(|| inline.get("mime_type"))
            .and_then(Value::as_str)
            .unwrap_or(fallback_mime)
            .to_string();
        let Some(data) = inline.get("data").and_then(Value::as_str) else {
            continue;
        };
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| FrameError::enhancement(format!("invalid base64 image data: {e}")))?;
        if bytes.is_empty() {
            continue;
        }
        return Ok(EnhancedImage { bytes, mime_type });
    }
    Err(FrameError::enhancement(
        "no image was generated in the response",
    ))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

fn build_headers(api_key: &str) -> anyhow::Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-goog-api-key",
        HeaderValue::from_str(api_key).context("invalid API key header value")?,
    );
    headers.insert("accept", HeaderValue::from_static("application/json"));
    headers.insert("content-type", HeaderValue::from_static("application/json"));
    Ok(headers)
}

#[cfg(test)]
#[path = "../../tests/unit/gateway/gemini.rs"]
mod tests;
