//! Pluggable LLM provider abstraction
//!
//! This module provides a provider-agnostic interface over the external
//! completion services used as a fallback when no canned rule matches.
//!
//! # Architecture
//!
//! - `ProviderBackend` trait: defines the completion and validation interface
//! - `ProviderClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAiBackend`, `GeminiBackend`, `MockBackend`
//! - `ProviderGateway`: credential-store-backed registry with lazy client
//!   construction, the single entry point the resolver talks to
//!
//! Every backend normalizes its wire-level error shapes into
//! [`ProviderError`] at this boundary; nothing provider-specific leaks past
//! it.

pub mod gemini;
pub mod mock;
pub mod openai;

pub use gemini::GeminiBackend;
pub use mock::MockBackend;
pub use openai::OpenAiBackend;

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProviderError, Result};
use crate::keys::KeyStore;

/// Domain context sent as the system message with every completion
pub const SYSTEM_CONTEXT: &str = include_str!("../../../../prompts/system_context.md");

/// Identifier for a configured provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenAi,
    Gemini,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }

    /// All providers in fallback priority order (OpenAI before Gemini).
    pub fn all() -> &'static [ProviderId] {
        &[Self::OpenAi, Self::Gemini]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderId {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "gemini" => Ok(Self::Gemini),
            other => Err(crate::error::Error::InvalidInput(format!(
                "unknown provider '{}', expected 'openai' or 'gemini'",
                other
            ))),
        }
    }
}

/// Trait defining the interface for all provider backends
///
/// Backends must be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait ProviderBackend: Send + Sync {
    /// Issue one chat completion. Failures are normalized into
    /// [`ProviderError`]; this never surfaces a raw transport error.
    async fn complete(
        &self,
        message: &str,
        system_context: &str,
    ) -> std::result::Result<String, ProviderError>;

    /// Cheap credential probe: true iff a minimal completion succeeds with a
    /// non-empty response. Any failure is reported as false, never
    /// propagated.
    async fn validate_credential(&self) -> bool;

    /// Backend name (for logging)
    fn name(&self) -> &'static str;
}

/// Concrete provider client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum ProviderClient {
    OpenAi(OpenAiBackend),
    Gemini(GeminiBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl ProviderClient {
    /// Build the default client for a provider from a stored secret.
    pub fn for_provider(provider: ProviderId, secret: &str) -> Self {
        match provider {
            ProviderId::OpenAi => Self::OpenAi(OpenAiBackend::new(secret)),
            ProviderId::Gemini => Self::Gemini(GeminiBackend::new(secret)),
        }
    }

    /// Create a mock client for testing
    pub fn mock() -> Self {
        Self::Mock(MockBackend::new())
    }
}

#[async_trait]
impl ProviderBackend for ProviderClient {
    async fn complete(
        &self,
        message: &str,
        system_context: &str,
    ) -> std::result::Result<String, ProviderError> {
        match self {
            Self::OpenAi(b) => b.complete(message, system_context).await,
            Self::Gemini(b) => b.complete(message, system_context).await,
            Self::Mock(b) => b.complete(message, system_context).await,
        }
    }

    async fn validate_credential(&self) -> bool {
        match self {
            Self::OpenAi(b) => b.validate_credential().await,
            Self::Gemini(b) => b.validate_credential().await,
            Self::Mock(b) => b.validate_credential().await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::OpenAi(b) => b.name(),
            Self::Gemini(b) => b.name(),
            Self::Mock(b) => b.name(),
        }
    }
}

/// Uniform gateway over the configured providers
///
/// Owns the credential store handle (injected at construction, never a
/// module-level global) and a per-provider client cache. Clients are built
/// lazily on first use after a key is saved or loaded, and discarded when
/// the key is cleared; this caching has no externally observable contract
/// beyond avoiding repeated construction.
pub struct ProviderGateway {
    store: KeyStore,
    clients: RwLock<HashMap<ProviderId, ProviderClient>>,
}

impl ProviderGateway {
    pub fn new(store: KeyStore) -> Self {
        Self {
            store,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Providers with a stored credential, in fallback priority order.
    pub fn available(&self) -> Vec<ProviderId> {
        ProviderId::all()
            .iter()
            .copied()
            .filter(|p| self.store.get(*p).is_some())
            .collect()
    }

    /// The stored secret for a provider, if any.
    pub fn key(&self, provider: ProviderId) -> Option<String> {
        self.store.get(provider)
    }

    /// Persist a secret and drop any cached client built from the old one.
    pub fn save_key(&mut self, provider: ProviderId, secret: &str) -> Result<()> {
        self.store.save(provider, secret)?;
        if let Ok(mut cache) = self.clients.write() {
            cache.remove(&provider);
        }
        debug!(provider = %provider, "API key saved");
        Ok(())
    }

    /// Remove a stored secret and its cached client.
    pub fn clear_key(&mut self, provider: ProviderId) -> Result<()> {
        self.store.clear(provider)?;
        if let Ok(mut cache) = self.clients.write() {
            cache.remove(&provider);
        }
        debug!(provider = %provider, "API key cleared");
        Ok(())
    }

    /// Probe a candidate secret before saving it.
    pub async fn validate(&self, provider: ProviderId, secret: &str) -> bool {
        ProviderClient::for_provider(provider, secret)
            .validate_credential()
            .await
    }

    /// Issue one completion through a specific provider.
    pub async fn complete_with(
        &self,
        provider: ProviderId,
        message: &str,
        system_context: &str,
    ) -> std::result::Result<String, ProviderError> {
        let client = self
            .client_for(provider)
            .ok_or(ProviderError::Unavailable)?;
        client.complete(message, system_context).await
    }

    /// Install a pre-built client for a provider.
    ///
    /// Used by tests to substitute a mock, and to point a backend at a
    /// non-default base URL. The provider still needs a stored key to be
    /// reported by `available`.
    pub fn set_client(&self, provider: ProviderId, client: ProviderClient) {
        if let Ok(mut cache) = self.clients.write() {
            cache.insert(provider, client);
        }
    }

    fn client_for(&self, provider: ProviderId) -> Option<ProviderClient> {
        if let Ok(cache) = self.clients.read() {
            if let Some(client) = cache.get(&provider) {
                return Some(client.clone());
            }
        }

        let secret = self.store.get(provider)?;
        let client = ProviderClient::for_provider(provider, &secret);
        if let Ok(mut cache) = self.clients.write() {
            cache.insert(provider, client.clone());
        }
        Some(client)
    }
}
