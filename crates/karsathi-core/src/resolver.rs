//! Response resolution for the chat loop
//!
//! Maps one user message to one response. The resolution order is a fixed
//! priority policy, not an accident:
//!
//! 1. Calculator trigger ("calculate" / "tax calculator")
//! 2. Canned topic table (ordered, loose substring matching)
//! 3. Fixed keyword rules (80C, 80D, regime comparison)
//! 4. Provider fallback chain (OpenAI before Gemini, first success wins)
//! 5. Generic fallback text
//!
//! Each call is one logical attempt: no internal retry, no state mutation.
//! Provider failures are recovered here and logged; the raw error never
//! reaches the end user.

use tracing::{debug, warn};

use crate::ai::{ProviderGateway, SYSTEM_CONTEXT};
use crate::responses;

/// Outcome of resolving one user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The caller should run the tax calculator flow, opening with `ack`
    Calculator { ack: String },
    /// A finished response to show verbatim
    Text(String),
}

const CALCULATOR_ACK: &str =
    "I'll help you calculate your tax! Let's work out your exact tax liability.";

const KEY_HINT: &str = "💡 **Tip:** Set up your AI API key with `karsathi keys set` \
                        to get answers to ANY question!";

const FALLBACK_CLOSING: &str = "Could you please be more specific about what you'd \
                                like to know? You can also try one of the quick topics \
                                from the greeting.";

/// Resolve one user message into a response.
pub async fn resolve(message: &str, providers: &ProviderGateway) -> Resolution {
    let lower = message.to_lowercase();

    if lower.contains("calculate") || lower.contains("tax calculator") {
        return Resolution::Calculator {
            ack: CALCULATOR_ACK.to_string(),
        };
    }

    if let Some(text) = responses::match_canned(message) {
        debug!("canned topic matched");
        return Resolution::Text(text.to_string());
    }

    // Fixed keyword rules come after the table, so an overlapping canned
    // entry wins first.
    if lower.contains("80c") {
        return Resolution::Text(responses::SECTION_80C.to_string());
    }
    if lower.contains("80d") {
        return Resolution::Text(responses::SECTION_80D.to_string());
    }
    if lower.contains("new") && lower.contains("old") && lower.contains("regime") {
        return Resolution::Text(responses::REGIME_COMPARISON.to_string());
    }

    // Strictly sequential fallback chain: a later provider is only tried
    // after the earlier one has fully failed.
    let available = providers.available();
    for provider in &available {
        match providers.complete_with(*provider, message, SYSTEM_CONTEXT).await {
            Ok(text) if !text.trim().is_empty() => {
                debug!(provider = %provider, "provider answered");
                return Resolution::Text(text);
            }
            Ok(_) => {
                warn!(provider = %provider, "provider returned an empty response");
            }
            Err(e) => {
                warn!(provider = %provider, error = %e, "provider call failed");
            }
        }
    }

    let mut text = responses::FALLBACK.trim_end().to_string();
    if available.is_empty() {
        text.push_str("\n\n");
        text.push_str(KEY_HINT);
    }
    text.push_str("\n\n");
    text.push_str(FALLBACK_CLOSING);
    Resolution::Text(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockBackend, ProviderClient, ProviderId};
    use crate::error::ProviderError;
    use crate::keys::KeyStore;

    fn gateway_without_providers() -> (tempfile::TempDir, ProviderGateway) {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::open(dir.path()).unwrap();
        (dir, ProviderGateway::new(store))
    }

    fn gateway_with_mock(
        provider: ProviderId,
        mock: MockBackend,
    ) -> (tempfile::TempDir, ProviderGateway) {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::open(dir.path()).unwrap();
        let mut gateway = ProviderGateway::new(store);
        gateway.save_key(provider, "test-key").unwrap();
        gateway.set_client(provider, ProviderClient::Mock(mock));
        (dir, gateway)
    }

    #[tokio::test]
    async fn test_calculator_trigger() {
        let (_dir, gateway) = gateway_without_providers();
        let resolution = resolve("calculate my tax", &gateway).await;
        assert!(matches!(resolution, Resolution::Calculator { .. }));

        let resolution = resolve("open the TAX CALCULATOR please", &gateway).await;
        assert!(matches!(resolution, Resolution::Calculator { .. }));
    }

    #[tokio::test]
    async fn test_calculator_trigger_beats_configured_provider() {
        let (_dir, gateway) =
            gateway_with_mock(ProviderId::OpenAi, MockBackend::replying("never seen"));
        let resolution = resolve("calculate my tax", &gateway).await;
        assert!(matches!(resolution, Resolution::Calculator { .. }));
    }

    #[tokio::test]
    async fn test_canned_match_beats_provider() {
        // The mock would answer, but the canned table takes priority.
        let (_dir, gateway) =
            gateway_with_mock(ProviderId::OpenAi, MockBackend::replying("provider text"));
        let resolution = resolve("explain tax slabs", &gateway).await;
        assert_eq!(
            resolution,
            Resolution::Text(responses::CANNED_RESPONSES[1].text.to_string())
        );
    }

    #[tokio::test]
    async fn test_keyword_rules() {
        let (_dir, gateway) = gateway_without_providers();

        let resolution = resolve("tell me about 80c investments", &gateway).await;
        assert_eq!(resolution, Resolution::Text(responses::SECTION_80C.to_string()));

        let resolution = resolve("is 80d separate from 80c?", &gateway).await;
        // 80c is checked first; rule order matters.
        assert_eq!(resolution, Resolution::Text(responses::SECTION_80C.to_string()));

        let resolution = resolve("new regime vs old regime", &gateway).await;
        assert_eq!(
            resolution,
            Resolution::Text(responses::REGIME_COMPARISON.to_string())
        );
    }

    #[tokio::test]
    async fn test_provider_answer_returned_verbatim() {
        let (_dir, gateway) = gateway_with_mock(
            ProviderId::OpenAi,
            MockBackend::replying("Advance tax is paid in installments."),
        );
        let resolution = resolve("tell me about advance payment timelines", &gateway).await;
        assert_eq!(
            resolution,
            Resolution::Text("Advance tax is paid in installments.".to_string())
        );
    }

    #[tokio::test]
    async fn test_provider_failure_falls_back_with_no_hint() {
        let (_dir, gateway) = gateway_with_mock(
            ProviderId::OpenAi,
            MockBackend::failing(ProviderError::QuotaExceeded),
        );
        let resolution = resolve("tell me a tax riddle", &gateway).await;
        match resolution {
            Resolution::Text(text) => {
                assert!(text.contains("topics I can assist you with"));
                // A key is configured, so no setup hint.
                assert!(!text.contains("Set up your AI API key"));
            }
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_providers_falls_back_with_hint() {
        let (_dir, gateway) = gateway_without_providers();
        let resolution = resolve("tell me a tax riddle", &gateway).await;
        match resolution {
            Resolution::Text(text) => {
                assert!(text.contains("topics I can assist you with"));
                assert!(text.contains("Set up your AI API key"));
            }
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_gemini_used_after_openai_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::open(dir.path()).unwrap();
        let mut gateway = ProviderGateway::new(store);
        gateway.save_key(ProviderId::OpenAi, "sk-key").unwrap();
        gateway.save_key(ProviderId::Gemini, "g-key").unwrap();
        gateway.set_client(
            ProviderId::OpenAi,
            ProviderClient::Mock(MockBackend::failing(ProviderError::InvalidCredential)),
        );
        gateway.set_client(
            ProviderId::Gemini,
            ProviderClient::Mock(MockBackend::replying("gemini answer")),
        );

        let resolution = resolve("tell me a tax riddle", &gateway).await;
        assert_eq!(resolution, Resolution::Text("gemini answer".to_string()));
    }

    #[tokio::test]
    async fn test_empty_provider_reply_treated_as_failure() {
        let (_dir, gateway) =
            gateway_with_mock(ProviderId::OpenAi, MockBackend::replying(""));
        let resolution = resolve("tell me a tax riddle", &gateway).await;
        match resolution {
            Resolution::Text(text) => assert!(text.contains("topics I can assist you with")),
            other => panic!("expected fallback text, got {:?}", other),
        }
    }
}
