//! Google Gemini backend
//!
//! Talks to the `generateContent` endpoint with the API key passed as a
//! query parameter. Gemini has no separate system-message slot in this API
//! surface, so the domain context is prepended to the user message. Error
//! bodies carry reason strings (`API_KEY_INVALID`, `RESOURCE_EXHAUSTED`)
//! which are normalized into [`ProviderError`] here.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;

use super::ProviderBackend;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Clone)]
pub struct GeminiBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiBackend {
    /// Create a backend against the public Gemini API
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Create a backend against a custom base URL (tests)
    pub fn with_base_url(base_url: &str, api_key: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            model: model.to_string(),
            api_key: self.api_key.clone(),
        }
    }

    pub fn host(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Make a content generation request
    async fn generate_content(&self, prompt: &str) -> std::result::Result<String, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .http_client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Unknown(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(normalize_error(status, &body));
        }

        let generated: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Unknown(e.to_string()))?;

        generated
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| ProviderError::Unknown("no candidates in response".to_string()))
    }
}

/// Map a Gemini error response onto the normalized taxonomy.
///
/// The API reports invalid keys as 400 with an `API_KEY_INVALID` reason, so
/// the body reason takes precedence over the HTTP status.
fn normalize_error(status: StatusCode, body: &str) -> ProviderError {
    if body.contains("API_KEY_INVALID") {
        return ProviderError::InvalidCredential;
    }
    if body.contains("QUOTA_EXCEEDED") || body.contains("RESOURCE_EXHAUSTED") {
        return ProviderError::QuotaExceeded;
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::InvalidCredential,
        StatusCode::TOO_MANY_REQUESTS => ProviderError::QuotaExceeded,
        _ => ProviderError::Unknown(format!("Gemini API error {}: {}", status, body)),
    }
}

/// Gemini content generation request
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

/// Gemini content generation response
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}

#[async_trait]
impl ProviderBackend for GeminiBackend {
    async fn complete(
        &self,
        message: &str,
        system_context: &str,
    ) -> std::result::Result<String, ProviderError> {
        let prompt = format!("{}\n\nUser: {}", system_context.trim_end(), message);
        debug!(model = %self.model, "Making request to Gemini API");
        let response = self.generate_content(&prompt).await?;
        debug!("Gemini response received");
        Ok(response)
    }

    async fn validate_credential(&self) -> bool {
        match self.generate_content("Hi").await {
            Ok(text) => !text.is_empty(),
            Err(e) => {
                debug!(error = %e, "Gemini key validation failed");
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockProviderServer;

    #[test]
    fn test_backend_new() {
        let backend = GeminiBackend::new("g-test123");
        assert_eq!(backend.model(), "gemini-1.5-flash");
        assert_eq!(backend.host(), "https://generativelanguage.googleapis.com");
    }

    #[test]
    fn test_request_serialization() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "context\n\nUser: hello".to_string(),
                }],
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "context\n\nUser: hello");
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [{"text": "Namaste!"}],
                    "role": "model"
                },
                "finishReason": "STOP"
            }]
        }"#;

        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.candidates[0].content.parts[0].text, "Namaste!");
    }

    #[test]
    fn test_empty_candidates_deserialization() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(response.candidates.is_empty());
    }

    #[test]
    fn test_normalize_error_reason_strings() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT","details":[{"reason":"API_KEY_INVALID"}]}}"#;
        assert_eq!(
            normalize_error(StatusCode::BAD_REQUEST, body),
            ProviderError::InvalidCredential
        );

        let body = r#"{"error":{"code":429,"status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(
            normalize_error(StatusCode::TOO_MANY_REQUESTS, body),
            ProviderError::QuotaExceeded
        );
    }

    #[test]
    fn test_normalize_error_falls_back_to_status() {
        assert_eq!(
            normalize_error(StatusCode::FORBIDDEN, "denied"),
            ProviderError::InvalidCredential
        );
        assert!(matches!(
            normalize_error(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            ProviderError::Unknown(_)
        ));
    }

    #[tokio::test]
    async fn test_complete_against_mock_server() {
        let server = MockProviderServer::start().await;
        let backend =
            GeminiBackend::with_base_url(&server.url(), MockProviderServer::VALID_KEY);

        let reply = backend.complete("what is cess?", "context").await.unwrap();
        assert!(reply.contains("what is cess?"));
    }

    #[tokio::test]
    async fn test_invalid_key_against_mock_server() {
        let server = MockProviderServer::start().await;
        let backend = GeminiBackend::with_base_url(&server.url(), "g-wrong");

        let err = backend.complete("hello", "context").await.unwrap_err();
        assert_eq!(err, ProviderError::InvalidCredential);
        assert!(!backend.validate_credential().await);
    }
}
