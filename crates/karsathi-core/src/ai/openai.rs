//! OpenAI chat completions backend
//!
//! Talks to the `/v1/chat/completions` endpoint with Bearer auth. Error
//! responses are normalized into [`ProviderError`] here so the resolver
//! never inspects OpenAI-specific error shapes.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;

use super::ProviderBackend;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Token budget for a full chat answer
const ANSWER_MAX_TOKENS: u32 = 500;
/// Token budget for the credential probe
const PROBE_MAX_TOKENS: u32 = 5;

#[derive(Clone)]
pub struct OpenAiBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl OpenAiBackend {
    /// Create a backend against the public OpenAI API
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Create a backend against a custom base URL (tests, compatible servers)
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

    /// Make a chat completion request
    async fn chat_completion(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> std::result::Result<String, ProviderError> {
        let mut messages = Vec::new();
        if !system.is_empty() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: user.to_string(),
        });

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(0.7),
            max_tokens: Some(max_tokens),
        };

        let response = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Unknown(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(normalize_error(status, &body));
        }

        let chat_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Unknown(e.to_string()))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ProviderError::Unknown("no choices in response".to_string()))
    }
}

/// Map an OpenAI error response onto the normalized taxonomy.
///
/// Error bodies look like `{"error":{"code":"invalid_api_key",...}}`; the
/// code takes precedence over the HTTP status when present.
fn normalize_error(status: StatusCode, body: &str) -> ProviderError {
    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
        match parsed.error.code.as_deref() {
            Some("invalid_api_key") => return ProviderError::InvalidCredential,
            Some("insufficient_quota") => return ProviderError::QuotaExceeded,
            _ => {}
        }
    }

    match status {
        StatusCode::UNAUTHORIZED => ProviderError::InvalidCredential,
        StatusCode::TOO_MANY_REQUESTS => ProviderError::QuotaExceeded,
        _ => ProviderError::Unknown(format!("OpenAI API error {}: {}", status, body)),
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Chat message
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

/// Chat completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

/// Chat response message
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// OpenAI error envelope
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
}

#[async_trait]
impl ProviderBackend for OpenAiBackend {
    async fn complete(
        &self,
        message: &str,
        system_context: &str,
    ) -> std::result::Result<String, ProviderError> {
        debug!(model = %self.model, "Making request to OpenAI API");
        let response = self
            .chat_completion(system_context, message, ANSWER_MAX_TOKENS)
            .await?;
        debug!("OpenAI response received");
        Ok(response)
    }

    async fn validate_credential(&self) -> bool {
        match self.chat_completion("", "Hi", PROBE_MAX_TOKENS).await {
            Ok(text) => !text.is_empty(),
            Err(e) => {
                debug!(error = %e, "OpenAI key validation failed");
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockProviderServer;

    #[test]
    fn test_backend_new() {
        let backend = OpenAiBackend::new("sk-test123");
        assert_eq!(backend.model(), "gpt-4o-mini");
        assert_eq!(backend.host(), "https://api.openai.com");
    }

    #[test]
    fn test_backend_trims_trailing_slash() {
        let backend = OpenAiBackend::with_base_url("http://localhost:8080/", "sk-test");
        assert_eq!(backend.host(), "http://localhost:8080");
    }

    #[test]
    fn test_with_model() {
        let backend = OpenAiBackend::new("sk-test").with_model("gpt-4o");
        assert_eq!(backend.model(), "gpt-4o");
    }

    #[test]
    fn test_chat_completion_request_serialization() {
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "context".to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: "Hello".to_string(),
                },
            ],
            temperature: Some(0.7),
            max_tokens: Some(500),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Hello");
        let temp = json["temperature"].as_f64().unwrap();
        assert!((temp - 0.7).abs() < 0.001);
        assert_eq!(json["max_tokens"], 500);
    }

    #[test]
    fn test_chat_completion_response_deserialization() {
        let json = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Namaste! How can I help?"
                },
                "finish_reason": "stop"
            }]
        }"#;

        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices.len(), 1);
        assert_eq!(
            response.choices[0].message.content,
            "Namaste! How can I help?"
        );
    }

    #[test]
    fn test_normalize_error_invalid_key_code() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        assert_eq!(
            normalize_error(StatusCode::UNAUTHORIZED, body),
            ProviderError::InvalidCredential
        );
    }

    #[test]
    fn test_normalize_error_quota_code() {
        let body = r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota","code":"insufficient_quota"}}"#;
        assert_eq!(
            normalize_error(StatusCode::TOO_MANY_REQUESTS, body),
            ProviderError::QuotaExceeded
        );
    }

    #[test]
    fn test_normalize_error_falls_back_to_status() {
        assert_eq!(
            normalize_error(StatusCode::UNAUTHORIZED, "not json"),
            ProviderError::InvalidCredential
        );
        assert_eq!(
            normalize_error(StatusCode::TOO_MANY_REQUESTS, ""),
            ProviderError::QuotaExceeded
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
            OpenAiBackend::with_base_url(&server.url(), MockProviderServer::VALID_KEY);

        let reply = backend.complete("what is cess?", "context").await.unwrap();
        assert_eq!(reply, "echo: what is cess?");
    }

    #[tokio::test]
    async fn test_complete_invalid_key_against_mock_server() {
        let server = MockProviderServer::start().await;
        let backend = OpenAiBackend::with_base_url(&server.url(), "sk-wrong");

        let err = backend.complete("hello", "context").await.unwrap_err();
        assert_eq!(err, ProviderError::InvalidCredential);
        assert!(!backend.validate_credential().await);
    }

    #[tokio::test]
    async fn test_complete_quota_key_against_mock_server() {
        let server = MockProviderServer::start().await;
        let backend =
            OpenAiBackend::with_base_url(&server.url(), MockProviderServer::QUOTA_KEY);

        let err = backend.complete("hello", "context").await.unwrap_err();
        assert_eq!(err, ProviderError::QuotaExceeded);
    }

    #[tokio::test]
    async fn test_validate_credential_against_mock_server() {
        let server = MockProviderServer::start().await;
        let backend =
            OpenAiBackend::with_base_url(&server.url(), MockProviderServer::VALID_KEY);
        assert!(backend.validate_credential().await);
    }
}
