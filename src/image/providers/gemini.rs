//! Gemini (Google) image generation provider.

use crate::config::DEFAULT_BASE_URL;
use crate::error::{parse_retry_after, sanitize_error_message, NanoVizError, Result};
use crate::image::provider::ImageProvider;
use crate::image::types::{ContentPart, ContentRequest, GeneratedImage, GenerationMetadata};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Gemini image model, selected by alias or literal id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Nano Banana - Gemini 2.5 Flash Image (fast, economical).
    NanoBanana,
    /// Nano Banana Pro - Gemini 3 Pro Image (highest quality).
    #[default]
    NanoBananaPro,
    /// Any other model id, used verbatim.
    Custom(String),
}

impl GeminiModel {
    /// Resolves a short alias (`pro`, `flash`), passing unknown values
    /// through unchanged as a model id.
    pub fn from_alias(alias: &str) -> Self {
        match alias {
            "pro" => Self::NanoBananaPro,
            "flash" => Self::NanoBanana,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Returns the API model identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Self::NanoBanana => "gemini-2.5-flash-image",
            Self::NanoBananaPro => "gemini-3-pro-image-preview",
            Self::Custom(id) => id,
        }
    }
}

impl std::fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Builder for GeminiProvider.
#[derive(Debug, Clone, Default)]
pub struct GeminiProviderBuilder {
    api_key: Option<String>,
    model: GeminiModel,
    base_url: Option<String>,
}

impl GeminiProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Gemini model.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Sets the API root. Defaults to the public Gemini endpoint.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the provider.
    pub fn build(self) -> Result<GeminiProvider> {
        let api_key = self.api_key.ok_or(NanoVizError::MissingApiKey)?;
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(GeminiProvider {
            client: reqwest::Client::new(),
            api_key,
            model: self.model,
            base_url,
        })
    }
}

/// Gemini image generation provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: GeminiModel,
    base_url: String,
}

impl GeminiProvider {
    /// Creates a new `GeminiProviderBuilder`.
    pub fn builder() -> GeminiProviderBuilder {
        GeminiProviderBuilder::new()
    }

    async fn generate_impl(&self, request: &ContentRequest) -> Result<GeneratedImage> {
        let start = Instant::now();

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url,
            self.model.as_str(),
        );

        let body = GeminiRequest::from_content_request(request);
        tracing::debug!(
            model = %self.model,
            parts = request.parts.len(),
            aspect_ratio = %request.aspect_ratio,
            "submitting Gemini generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers));
        }

        let gemini_response: GeminiResponse = response.json().await?;
        let image = extract_image(gemini_response, self.model.as_str(), start)?;

        tracing::debug!(
            model = %self.model,
            bytes = image.size(),
            duration_ms = image.metadata.duration_ms,
            "Gemini image generation complete"
        );
        Ok(image)
    }
}

#[async_trait]
impl ImageProvider for GeminiProvider {
    async fn generate(&self, request: &ContentRequest) -> Result<GeneratedImage> {
        self.generate_impl(request).await
    }

    fn model(&self) -> &str {
        self.model.as_str()
    }
}

/// Maps a non-success HTTP response onto an error.
fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> NanoVizError {
    let text = sanitize_error_message(text);
    if status == 402 {
        return NanoVizError::Billing(
            "Gemini billing issue: enable billing at https://aistudio.google.com".into(),
        );
    }
    if status == 404 {
        return NanoVizError::InvalidRequest(
            "Model not found. Verify the model name is correct.".into(),
        );
    }
    if status == 429 {
        let retry_after = parse_retry_after(headers).map(std::time::Duration::from_secs);
        return NanoVizError::RateLimited { retry_after };
    }
    if status == 401 || status == 403 {
        return NanoVizError::Auth(text);
    }
    let lower = text.to_lowercase();
    if lower.contains("safety")
        || lower.contains("blocked")
        || lower.contains("content_policy")
        || lower.contains("prohibited")
    {
        return NanoVizError::ContentBlocked(text);
    }
    NanoVizError::Api {
        status,
        message: text,
    }
}

/// Pulls the first inline image out of a successful response.
///
/// An image in the first candidate is returned even when the response also
/// reports a block or safety finish reason. Without one, the most specific
/// explanation available becomes a [`NanoVizError::NoImage`].
fn extract_image(response: GeminiResponse, model: &str, start: Instant) -> Result<GeneratedImage> {
    let GeminiResponse {
        candidates,
        prompt_feedback,
    } = response;
    let candidate = candidates.into_iter().next();
    let finish_reason = candidate.as_ref().and_then(|c| c.finish_reason.clone());
    let parts = candidate
        .and_then(|c| c.content)
        .map(|c| c.parts)
        .unwrap_or_default();

    let mut text = Vec::new();
    let mut inline_data = None;
    for part in parts {
        if let Some(data) = part.inline_data {
            inline_data = Some(data);
            break;
        }
        if let Some(t) = part.text {
            text.push(t);
        }
    }

    let Some(inline_data) = inline_data else {
        return Err(no_image_reason(
            prompt_feedback.as_ref(),
            finish_reason.as_deref(),
            &text,
        ));
    };

    let data = base64::engine::general_purpose::STANDARD
        .decode(&inline_data.data)
        .map_err(|e| NanoVizError::Decode(e.to_string()))?;

    let duration_ms = start.elapsed().as_millis() as u64;
    let text = Some(text.join("\n")).filter(|t| !t.trim().is_empty());

    Ok(GeneratedImage::new(
        data,
        inline_data.mime_type,
        GenerationMetadata {
            model: Some(model.to_string()),
            duration_ms: Some(duration_ms),
            text,
        },
    ))
}

/// Explains why a successful response carried no image.
fn no_image_reason(
    feedback: Option<&PromptFeedback>,
    finish_reason: Option<&str>,
    text: &[String],
) -> NanoVizError {
    // Prompt blocks come back as HTTP 200 with no candidates.
    if let Some(reason) = feedback.and_then(|f| f.block_reason.as_deref()) {
        let msg = feedback
            .and_then(|f| f.block_reason_message.clone())
            .unwrap_or_else(|| format!("Prompt blocked: {}", reason));
        return NanoVizError::NoImage(format!("content blocked: {}", msg));
    }

    match finish_reason {
        Some(
            reason @ ("SAFETY"
            | "IMAGE_SAFETY"
            | "IMAGE_PROHIBITED_CONTENT"
            | "IMAGE_RECITATION"
            | "RECITATION"
            | "PROHIBITED_CONTENT"
            | "BLOCKLIST"),
        ) => {
            return NanoVizError::NoImage(format!(
                "content blocked by Gemini safety filter: {}",
                reason
            ));
        }
        Some(reason @ ("IMAGE_OTHER" | "NO_IMAGE")) => {
            return NanoVizError::NoImage(format!(
                "generation finished with {}. Try a different prompt.",
                reason
            ));
        }
        _ => {} // STOP, MAX_TOKENS, etc. are normal
    }

    let reply = text.join(" ");
    if reply.trim().is_empty() {
        NanoVizError::NoImage("no inline image data in any response part".into())
    } else {
        NanoVizError::NoImage(format!("model replied with text only: {}", reply.trim()))
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - can be text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<String>,
    image_config: GeminiImageConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiImageConfig {
    aspect_ratio: String,
}

impl GeminiRequest {
    fn from_content_request(req: &ContentRequest) -> Self {
        let parts = req
            .parts
            .iter()
            .map(|part| match part {
                ContentPart::InlineImage { mime_type, data } => GeminiRequestPart::InlineData {
                    inline_data: GeminiInlineData {
                        mime_type: mime_type.clone(),
                        data: base64::engine::general_purpose::STANDARD.encode(data),
                    },
                },
                ContentPart::Text(text) => GeminiRequestPart::Text { text: text.clone() },
            })
            .collect();

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig {
                response_modalities: vec!["IMAGE".to_string(), "TEXT".to_string()],
                image_config: GeminiImageConfig {
                    aspect_ratio: req.aspect_ratio.as_str().to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::image::types::AspectRatio;
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};

    fn parse(json: &str) -> Result<GeneratedImage> {
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        extract_image(resp, "gemini-3-pro-image-preview", Instant::now())
    }

    #[test]
    fn test_gemini_model_aliases() {
        assert_eq!(
            GeminiModel::from_alias("pro").as_str(),
            "gemini-3-pro-image-preview"
        );
        assert_eq!(
            GeminiModel::from_alias("flash").as_str(),
            "gemini-2.5-flash-image"
        );
    }

    #[test]
    fn test_unknown_model_passes_through() {
        assert_eq!(
            GeminiModel::from_alias("gemini-2.0-flash-exp").as_str(),
            "gemini-2.0-flash-exp"
        );
        assert_eq!(GeminiModel::from_alias("PRO").as_str(), "PRO");
    }

    #[test]
    fn test_gemini_model_default() {
        assert_eq!(GeminiModel::default(), GeminiModel::NanoBananaPro);
    }

    #[test]
    fn test_builder_requires_key() {
        let result = GeminiProviderBuilder::new().build();
        assert!(matches!(result, Err(NanoVizError::MissingApiKey)));
    }

    #[test]
    fn test_builder_with_explicit_key() {
        let provider = GeminiProviderBuilder::new()
            .api_key("test-key")
            .model(GeminiModel::NanoBanana)
            .base_url("http://localhost:1234/v1beta/")
            .build()
            .unwrap();
        assert_eq!(provider.model(), "gemini-2.5-flash-image");
        assert_eq!(provider.base_url, "http://localhost:1234/v1beta");
    }

    #[test]
    fn test_request_construction_prompt_only() {
        let req = ContentRequest::new(Vec::new(), "A puppy", AspectRatio::Landscape);
        let json = serde_json::to_value(GeminiRequest::from_content_request(&req)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "contents": [{ "parts": [{ "text": "A puppy" }] }],
                "generationConfig": {
                    "responseModalities": ["IMAGE", "TEXT"],
                    "imageConfig": { "aspectRatio": "16:9" }
                }
            })
        );
    }

    #[test]
    fn test_request_construction_with_images() {
        let images = vec![
            ContentPart::InlineImage {
                mime_type: "image/jpeg".into(),
                data: b"jpeg-bytes".to_vec(),
            },
            ContentPart::InlineImage {
                mime_type: "image/png".into(),
                data: b"png-bytes".to_vec(),
            },
        ];
        let req = ContentRequest::new(images, "Blend these", AspectRatio::from_alias("4:3"));
        let json = serde_json::to_value(GeminiRequest::from_content_request(&req)).unwrap();

        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(
            parts[0]["inlineData"]["data"],
            base64::engine::general_purpose::STANDARD.encode(b"jpeg-bytes")
        );
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[2]["text"], "Blend these");
        assert_eq!(json["generationConfig"]["imageConfig"]["aspectRatio"], "4:3");
        assert!(json.get("generation_config").is_none());
    }

    #[test]
    fn test_extract_first_inline_image() {
        let image = parse(
            r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here is your image." },
                        { "inlineData": { "mimeType": "image/png", "data": "Zmlyc3Q=" } },
                        { "inlineData": { "mimeType": "image/png", "data": "c2Vjb25k" } }
                    ]
                },
                "finishReason": "STOP"
            }]
        }"#,
        )
        .unwrap();

        assert_eq!(image.data, b"first");
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.metadata.text.as_deref(), Some("Here is your image."));
        assert_eq!(
            image.metadata.model.as_deref(),
            Some("gemini-3-pro-image-preview")
        );
    }

    #[test]
    fn test_text_only_response_is_no_image() {
        let err = parse(
            r#"{
            "candidates": [{
                "content": { "parts": [{ "text": "I can't draw that." }] },
                "finishReason": "STOP"
            }]
        }"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoContent);
        assert!(err.to_string().contains("I can't draw that."));
    }

    #[test]
    fn test_empty_parts_is_no_image() {
        let err = parse(r#"{ "candidates": [{ "content": { "parts": [{}] } }] }"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoContent);

        let err = parse(r#"{ "candidates": [] }"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoContent);

        let err = parse(r#"{ "candidates": [{ "finishReason": "NO_IMAGE" }] }"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoContent);
    }

    #[test]
    fn test_prompt_feedback_block_is_no_image() {
        let err = parse(
            r#"{
            "candidates": [],
            "promptFeedback": {
                "blockReason": "SAFETY",
                "blockReasonMessage": "Prompt was blocked due to safety"
            }
        }"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoContent);
        assert!(err.to_string().contains("Prompt was blocked due to safety"));

        let err = parse(r#"{ "candidates": [], "promptFeedback": { "blockReason": "OTHER" } }"#)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoContent);
        assert!(err.to_string().contains("OTHER"));
    }

    #[test]
    fn test_safety_finish_reason_without_image_is_no_image() {
        let err = parse(r#"{ "candidates": [{ "finishReason": "IMAGE_SAFETY" }] }"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoContent);
        assert!(err.to_string().contains("IMAGE_SAFETY"));

        let err = parse(r#"{ "candidates": [{ "finishReason": "SAFETY" }] }"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoContent);
    }

    #[test]
    fn test_image_kept_despite_safety_finish_reason() {
        let image = parse(
            r#"{
            "candidates": [{
                "content": { "parts": [{ "inlineData": { "mimeType": "image/png", "data": "aW1n" } }] },
                "finishReason": "IMAGE_SAFETY"
            }]
        }"#,
        )
        .unwrap();
        assert_eq!(image.data, b"img");
    }

    #[test]
    fn test_image_kept_despite_prompt_feedback() {
        let image = parse(
            r#"{
            "candidates": [{
                "content": { "parts": [{ "inlineData": { "mimeType": "image/png", "data": "aW1n" } }] }
            }],
            "promptFeedback": { "blockReason": "OTHER" }
        }"#,
        )
        .unwrap();
        assert_eq!(image.data, b"img");
    }

    #[test]
    fn test_bad_base64_is_decode_error() {
        let err = parse(
            r#"{
            "candidates": [{
                "content": { "parts": [{ "inlineData": { "mimeType": "image/png", "data": "!!!" } }] }
            }]
        }"#,
        )
        .unwrap_err();
        assert!(matches!(err, NanoVizError::Decode(_)));
        assert_eq!(err.kind(), ErrorKind::Vendor);
    }

    #[test]
    fn test_parse_error_by_status() {
        let headers = HeaderMap::new();
        assert!(matches!(
            parse_error(401, "API key not valid", &headers),
            NanoVizError::Auth(_)
        ));
        assert!(matches!(
            parse_error(403, "permission denied", &headers),
            NanoVizError::Auth(_)
        ));
        assert!(matches!(
            parse_error(404, "not found", &headers),
            NanoVizError::InvalidRequest(_)
        ));
        assert!(matches!(
            parse_error(402, "", &headers),
            NanoVizError::Billing(_)
        ));
        assert!(matches!(
            parse_error(400, "request blocked by safety settings", &headers),
            NanoVizError::ContentBlocked(_)
        ));
        assert!(matches!(
            parse_error(500, "internal", &headers),
            NanoVizError::Api { status: 500, .. }
        ));
    }

    #[test]
    fn test_parse_error_rate_limit_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("12"));
        match parse_error(429, "quota exceeded", &headers) {
            NanoVizError::RateLimited { retry_after } => {
                assert_eq!(retry_after, Some(std::time::Duration::from_secs(12)));
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }
}
