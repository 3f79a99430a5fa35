//! Mock provider backend for testing
//!
//! Returns a scripted reply or a scripted failure without any network I/O.

use async_trait::async_trait;

use crate::error::ProviderError;

use super::ProviderBackend;

#[derive(Clone, Default)]
pub struct MockBackend {
    reply: String,
    failure: Option<ProviderError>,
}

impl MockBackend {
    /// Create a mock that answers every completion with a fixed reply
    pub fn new() -> Self {
        Self::replying("mock reply")
    }

    pub fn replying(text: &str) -> Self {
        Self {
            reply: text.to_string(),
            failure: None,
        }
    }

    /// Create a mock that fails every completion with the given error
    pub fn failing(error: ProviderError) -> Self {
        Self {
            reply: String::new(),
            failure: Some(error),
        }
    }
}

#[async_trait]
impl ProviderBackend for MockBackend {
    async fn complete(
        &self,
        _message: &str,
        _system_context: &str,
    ) -> std::result::Result<String, ProviderError> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(self.reply.clone()),
        }
    }

    async fn validate_credential(&self) -> bool {
        self.failure.is_none() && !self.reply.is_empty()
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_replies() {
        let mock = MockBackend::replying("hello");
        assert_eq!(mock.complete("q", "ctx").await.unwrap(), "hello");
        assert!(mock.validate_credential().await);
    }

    #[tokio::test]
    async fn test_mock_fails() {
        let mock = MockBackend::failing(ProviderError::QuotaExceeded);
        assert_eq!(
            mock.complete("q", "ctx").await.unwrap_err(),
            ProviderError::QuotaExceeded
        );
        assert!(!mock.validate_credential().await);
    }
}
