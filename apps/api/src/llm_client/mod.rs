/// LLM Client — the single point of entry for all Gemini API calls in TalentFlow.
///
/// No other module talks to the provider directly. Callers go through
/// `TieredGenerator`, which owns the fallback policy; the `ModelBackend`
/// implementations below only know how to make one call against one model.
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod tiers;

#[cfg(test)]
pub mod testing;

pub use tiers::{Tier, TieredGenerator};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing GOOGLE_API_KEY. Add it to your .env or environment.")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Quota exhausted for model '{model}': {message}")]
    QuotaExhausted { model: String, message: String },

    #[error("Model '{model}' not found: {message}")]
    ModelNotFound { model: String, message: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Prompt was blocked by the provider: {reason}")]
    Blocked { reason: String },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("No model tiers configured")]
    NoTiers,
}

impl LlmError {
    /// Provider-side failures that the tier policy may retry or fall back on.
    /// Everything else (configuration, decoding, blocked prompts) propagates at once.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            LlmError::Http(_)
                | LlmError::QuotaExhausted { .. }
                | LlmError::ModelNotFound { .. }
                | LlmError::Api { .. }
        )
    }
}

/// Provider credential. Constructing one is the only way to build a `GeminiClient`,
/// so a missing key fails at startup instead of at the first request.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Result<Self, LlmError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }
        Ok(Self(key.trim().to_string()))
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// One generation call: ordered content parts plus sampling temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub parts: Vec<String>,
    pub temperature: f32,
}

impl GenerationRequest {
    pub fn single(instruction: impl Into<String>, temperature: f32) -> Self {
        Self {
            parts: vec![instruction.into()],
            temperature,
        }
    }
}

/// A single call against a single named model. No retries at this level.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn generate(&self, model: &str, request: &GenerationRequest)
        -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn into_text(self) -> Result<String, LlmError> {
        if let Some(text) = self.text() {
            return Ok(text);
        }
        let finish_reason = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.finish_reason)
            .filter(|r| r != "STOP");
        match self
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .or(finish_reason)
        {
            Some(reason) => Err(LlmError::Blocked { reason }),
            None => Err(LlmError::EmptyContent),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Maps a non-success response onto the provider error taxonomy.
fn classify_error(model: &str, status: u16, body: &str) -> LlmError {
    let (message, provider_status) = match serde_json::from_str::<GeminiError>(body) {
        Ok(parsed) => (parsed.error.message, parsed.error.status),
        Err(_) => (body.to_string(), String::new()),
    };

    match (status, provider_status.as_str()) {
        (429, _) | (_, "RESOURCE_EXHAUSTED") => LlmError::QuotaExhausted {
            model: model.to_string(),
            message,
        },
        (404, _) | (_, "NOT_FOUND") => LlmError::ModelNotFound {
            model: model.to_string(),
            message,
        },
        _ => LlmError::Api { status, message },
    }
}

// ────────────────────────────────────────────────────────────────────────────
// GeminiClient
// ────────────────────────────────────────────────────────────────────────────

/// Production backend for the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: ApiKey,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: ApiKey, base_url: &str, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl ModelBackend for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<String, LlmError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: request.parts.iter().map(|p| Part { text: p }).collect(),
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
            },
        };

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", self.api_key.expose())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(classify_error(model, status.as_u16(), &text));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                model,
                prompt_tokens = usage.prompt_token_count.unwrap_or(0),
                output_tokens = usage.candidates_token_count.unwrap_or(0),
                "Gemini call succeeded"
            );
        }

        parsed.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_rejects_blank() {
        assert!(matches!(ApiKey::new("  "), Err(LlmError::MissingApiKey)));
        assert!(matches!(ApiKey::new(""), Err(LlmError::MissingApiKey)));
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("super-secret").unwrap();
        assert!(!format!("{key:?}").contains("super-secret"));
    }

    #[test]
    fn test_classify_quota_by_status_code() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        match classify_error("gemini-1.5-pro", 429, body) {
            LlmError::QuotaExhausted { model, message } => {
                assert_eq!(model, "gemini-1.5-pro");
                assert_eq!(message, "Quota exceeded");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_classify_not_found() {
        let body = r#"{"error":{"code":404,"message":"models/x is not found","status":"NOT_FOUND"}}"#;
        assert!(matches!(
            classify_error("x", 404, body),
            LlmError::ModelNotFound { .. }
        ));
    }

    #[test]
    fn test_classify_generic_api_error_keeps_raw_body() {
        let err = classify_error("m", 503, "upstream unavailable");
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "upstream unavailable");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_provider_failure_classification() {
        assert!(LlmError::Api {
            status: 500,
            message: String::new()
        }
        .is_provider_failure());
        assert!(!LlmError::MissingApiKey.is_provider_failure());
        assert!(!LlmError::EmptyContent.is_provider_failure());
        assert!(!LlmError::Blocked {
            reason: "SAFETY".to_string()
        }
        .is_provider_failure());
    }

    #[test]
    fn test_response_text_concatenates_parts() {
        let body = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "Match: "}, {"text": "85%"}], "role": "model"},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 4}
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.into_text().unwrap(), "Match: 85%");
    }

    #[test]
    fn test_blocked_prompt_reports_reason() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert!(matches!(
            parsed.into_text(),
            Err(LlmError::Blocked { reason }) if reason == "SAFETY"
        ));
    }

    #[test]
    fn test_candidate_stopped_for_safety_is_blocked() {
        let body = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert!(matches!(
            parsed.into_text(),
            Err(LlmError::Blocked { reason }) if reason == "SAFETY"
        ));
    }

    #[test]
    fn test_empty_candidates_is_empty_content() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(parsed.into_text(), Err(LlmError::EmptyContent)));
    }

    #[test]
    fn test_request_serializes_to_gemini_shape() {
        let request = GenerationRequest::single("hello", 0.2);
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: request.parts.iter().map(|p| Part { text: p }).collect(),
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert!(json["generationConfig"]["temperature"].is_number());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = GeminiClient::new(
            ApiKey::new("k").unwrap(),
            "https://example.test/v1beta/",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.endpoint("gemini-1.5-flash"),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }
}
