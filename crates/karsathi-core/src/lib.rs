//! KarSathi Core Library
//!
//! Shared functionality for the KarSathi income-tax assistant:
//! - Progressive tax engine for the new/old regime slab schedules
//! - Canned response library with ordered loose topic matching
//! - Response resolver (calculator trigger → canned table → keyword rules
//!   → provider fallback chain → generic fallback)
//! - Pluggable LLM provider backends (OpenAI, Gemini) with normalized errors
//! - Durable credential store for provider API keys
//! - Append-only chat transcript types

pub mod ai;
pub mod error;
pub mod keys;
pub mod resolver;
pub mod responses;
pub mod session;
pub mod tax;

/// Test utilities including the mock provider server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    GeminiBackend, MockBackend, OpenAiBackend, ProviderBackend, ProviderClient, ProviderGateway,
    ProviderId, SYSTEM_CONTEXT,
};
pub use error::{Error, ProviderError, Result};
pub use keys::KeyStore;
pub use resolver::{resolve, Resolution};
pub use responses::{match_canned, CannedResponse, CANNED_RESPONSES};
pub use session::{ChatTurn, Transcript};
pub use tax::{
    compute_tax, format_inr, parse_amount, Regime, TaxBracket, TaxQuery, TaxResult,
};
