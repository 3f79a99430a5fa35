//! Error types for KarSathi

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Key store error: {0}")]
    KeyStore(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Normalized provider failure taxonomy.
///
/// Every provider adapter maps its wire-level error shapes onto these
/// variants at the boundary; the resolver never inspects provider-specific
/// payloads.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("invalid API key")]
    InvalidCredential,

    #[error("quota exceeded")]
    QuotaExceeded,

    #[error("no API key configured")]
    Unavailable,

    #[error("provider error: {0}")]
    Unknown(String),
}
