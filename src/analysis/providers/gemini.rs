//! Gemini (Google) vision analysis provider.

use crate::analysis::prompt::PROPERTY_ANALYSIS_PROMPT;
use crate::analysis::provider::SceneAnalyzer;
use crate::config::{resolve_api_key, GEMINI_ENV_VARS};
use crate::error::{parse_retry_after, sanitize_error_message, Result, YardVizError};
use crate::imagery::AcquiredImage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini vision model variants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GeminiVisionModel {
    /// Gemini 1.5 Flash (fast, economical).
    #[default]
    Flash15,
    /// Gemini 2.0 Flash.
    Flash20,
    /// Any other model id.
    Custom(String),
}

impl GeminiVisionModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Flash15 => "gemini-1.5-flash",
            Self::Flash20 => "gemini-2.0-flash",
            Self::Custom(id) => id,
        }
    }
}

/// Builder for [`GeminiAnalyzer`].
#[derive(Debug, Clone, Default)]
pub struct GeminiAnalyzerBuilder {
    api_key: Option<String>,
    model: GeminiVisionModel,
    prompt: Option<String>,
    base_url: Option<String>,
}

impl GeminiAnalyzerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GEMINI_API_KEY`, `API_KEY`, then
    /// `GOOGLE_API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiVisionModel) -> Self {
        self.model = model;
        self
    }

    /// Replaces the assessment instruction.
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Overrides the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the analyzer, resolving the API key.
    pub fn build(self) -> Result<GeminiAnalyzer> {
        let api_key = resolve_api_key(
            self.api_key,
            GEMINI_ENV_VARS,
            "Gemini API Key is not configured.",
        )?;

        Ok(GeminiAnalyzer {
            client: reqwest::Client::new(),
            api_key,
            model: self.model,
            prompt: self
                .prompt
                .unwrap_or_else(|| PROPERTY_ANALYSIS_PROMPT.to_string()),
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }
}

/// Gemini vision analyzer.
pub struct GeminiAnalyzer {
    client: reqwest::Client,
    api_key: String,
    model: GeminiVisionModel,
    prompt: String,
    base_url: String,
}

impl GeminiAnalyzer {
    /// Creates a new [`GeminiAnalyzerBuilder`].
    pub fn builder() -> GeminiAnalyzerBuilder {
        GeminiAnalyzerBuilder::new()
    }

    async fn analyze_impl(&self, image: &AcquiredImage) -> Result<String> {
        let start = Instant::now();

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url,
            self.model.as_str(),
        );

        let body = GeminiRequest::new(&self.prompt, image);

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
        let text = gemini_response.into_text()?;

        tracing::debug!(
            model = self.model.as_str(),
            chars = text.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "scene analysis complete"
        );

        Ok(text)
    }
}

fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> YardVizError {
    let message = match serde_json::from_str::<GeminiErrorResponse>(text) {
        Ok(e) => sanitize_error_message(&e.error.message),
        Err(_) => sanitize_error_message(text),
    };

    match status {
        401 | 403 => YardVizError::Auth(message),
        404 => YardVizError::Api {
            status,
            message: "Model not found. Verify the model name is correct.".into(),
        },
        429 => YardVizError::RateLimited {
            retry_after: parse_retry_after(headers),
        },
        _ => YardVizError::Api { status, message },
    }
}

#[async_trait]
impl SceneAnalyzer for GeminiAnalyzer {
    async fn analyze(&self, image: &AcquiredImage) -> Result<String> {
        self.analyze_impl(image).await
    }

    fn name(&self) -> &str {
        "Gemini (Google)"
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - text or inline image data.
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

impl GeminiRequest {
    fn new(prompt: &str, image: &AcquiredImage) -> Self {
        Self {
            contents: vec![GeminiContent {
                parts: vec![
                    GeminiRequestPart::Text {
                        text: prompt.to_string(),
                    },
                    GeminiRequestPart::InlineData {
                        inline_data: GeminiInlineData {
                            mime_type: image.mime_type().to_string(),
                            data: image.to_base64(),
                        },
                    },
                ],
            }],
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
struct GeminiPartResponse {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

impl GeminiResponse {
    /// Joins the text parts of the first candidate.
    fn into_text(self) -> Result<String> {
        // Prompt blocks come back as HTTP 200
        if let Some(feedback) = self.prompt_feedback {
            if let Some(reason) = feedback.block_reason {
                let msg = feedback
                    .block_reason_message
                    .unwrap_or_else(|| format!("Prompt blocked: {}", reason));
                return Err(YardVizError::ContentBlocked(msg));
            }
        }

        let candidate = self.candidates.into_iter().next().ok_or_else(|| {
            YardVizError::UnexpectedResponse("No candidates in Gemini response".into())
        })?;

        if let Some(reason) = candidate.finish_reason.as_deref() {
            if matches!(
                reason,
                "SAFETY" | "RECITATION" | "PROHIBITED_CONTENT" | "BLOCKLIST" | "SPII"
            ) {
                return Err(YardVizError::ContentBlocked(format!(
                    "Analysis blocked by Gemini safety filter: {}",
                    reason
                )));
            }
        }

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(YardVizError::UnexpectedResponse(
                "No text in Gemini response".into(),
            ));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagery::ViewingAngle;

    fn image() -> AcquiredImage {
        AcquiredImage::new(
            b"jpeg-bytes".to_vec(),
            Some("image/jpeg"),
            ViewingAngle::new(0, 90, 0),
            "1 Main St",
        )
    }

    #[test]
    fn test_model_as_str() {
        assert_eq!(GeminiVisionModel::default().as_str(), "gemini-1.5-flash");
        assert_eq!(GeminiVisionModel::Flash20.as_str(), "gemini-2.0-flash");
        assert_eq!(
            GeminiVisionModel::Custom("gemini-exp".into()).as_str(),
            "gemini-exp"
        );
    }

    #[test]
    fn test_builder_with_explicit_key() {
        let analyzer = GeminiAnalyzerBuilder::new()
            .api_key("test-key")
            .model(GeminiVisionModel::Flash20)
            .build()
            .unwrap();
        assert_eq!(analyzer.prompt, PROPERTY_ANALYSIS_PROMPT);
        assert_eq!(analyzer.model, GeminiVisionModel::Flash20);
    }

    #[test]
    fn test_request_serialization() {
        let req = GeminiRequest::new("Assess this", &image());
        let json = serde_json::to_value(&req).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "Assess this");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inlineData"]["data"], image().to_base64());
    }

    #[test]
    fn test_response_text_joined() {
        let json = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "Lawn: patchy. "}, {"text": "Priority: High"}]},
                "finishReason": "STOP"
            }]
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.into_text().unwrap(), "Lawn: patchy. Priority: High");
    }

    #[test]
    fn test_response_prompt_blocked() {
        let json = r#"{
            "candidates": [],
            "promptFeedback": {"blockReason": "SAFETY"}
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        let err = resp.into_text().unwrap_err();
        assert!(matches!(err, YardVizError::ContentBlocked(ref m) if m == "Prompt blocked: SAFETY"));
    }

    #[test]
    fn test_response_safety_finish_reason() {
        let json = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            resp.into_text(),
            Err(YardVizError::ContentBlocked(_))
        ));
    }

    #[test]
    fn test_response_without_text() {
        let json = r#"{"candidates": [{"content": {"parts": [{}]}}]}"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            resp.into_text(),
            Err(YardVizError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_parse_error_uses_provider_message() {
        let headers = reqwest::header::HeaderMap::new();
        let err = parse_error(
            400,
            r#"{"error": {"code": 400, "message": "Image too large"}}"#,
            &headers,
        );
        assert_eq!(err.user_message(), "Image too large");

        assert!(matches!(
            parse_error(403, "forbidden", &headers),
            YardVizError::Auth(_)
        ));
        assert!(matches!(
            parse_error(429, "", &headers),
            YardVizError::RateLimited { .. }
        ));
    }

    #[test]
    fn test_parse_error_long_body_keeps_message() {
        let headers = reqwest::header::HeaderMap::new();
        let padding = "x".repeat(600);
        let body = format!(
            r#"{{
  "error": {{
    "code": 400,
    "message": "API key not valid. Please pass a valid API key.",
    "status": "INVALID_ARGUMENT",
    "details": [{{"reason": "API_KEY_INVALID", "metadata": {{"note": "{padding}"}}}}]
  }}
}}"#
        );
        assert!(body.len() > 500);

        let err = parse_error(400, &body, &headers);
        assert_eq!(
            err.user_message(),
            "API key not valid. Please pass a valid API key."
        );

        let err = parse_error(401, &body, &headers);
        assert!(matches!(
            err,
            YardVizError::Auth(ref m) if m == "API key not valid. Please pass a valid API key."
        ));
    }
}
