//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `calc` - One-shot tax calculation
//! - `chat` - Interactive chat session (owns the transcript)
//! - `keys` - Provider API key management (set, status, clear)

pub mod calc;
pub mod chat;
pub mod keys;

// Re-export command functions for main.rs
pub use calc::*;
pub use chat::*;
pub use keys::*;

use std::path::Path;

use anyhow::Result;
use karsathi_core::{KeyStore, ProviderGateway};
use tracing::debug;

/// Open the credential store and wrap it in a provider gateway.
pub fn open_gateway(data_dir: Option<&Path>) -> Result<ProviderGateway> {
    let store = match data_dir {
        Some(dir) => {
            debug!(dir = %dir.display(), "using data directory override");
            KeyStore::open(dir)?
        }
        None => KeyStore::open_default()?,
    };
    Ok(ProviderGateway::new(store))
}
