//! Credential store for provider API keys
//!
//! Secrets are kept as a JSON map from provider id to key, persisted under
//! the platform data directory (~/.local/share/karsathi on Linux/Mac).
//! Writes go through a temp file in the same directory and an atomic rename,
//! so a crash mid-write never corrupts the stored keys.
//!
//! The store is single-threaded by construction: there is no locking, and
//! concurrent saves from multiple processes are last-write-wins.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ai::ProviderId;
use crate::error::{Error, Result};

const KEYS_FILE: &str = "keys.json";

pub struct KeyStore {
    path: PathBuf,
    keys: HashMap<ProviderId, String>,
}

impl KeyStore {
    /// Open (or create) the store inside the given directory.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(KEYS_FILE);
        let keys = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            HashMap::new()
        };
        debug!(path = %path.display(), entries = keys.len(), "key store opened");
        Ok(Self { path, keys })
    }

    /// Open the store in the platform data directory.
    pub fn open_default() -> Result<Self> {
        let dir = dirs::data_dir()
            .ok_or_else(|| Error::KeyStore("could not determine data directory".to_string()))?
            .join("karsathi");
        Self::open(&dir)
    }

    /// Save or overwrite the secret for a provider.
    pub fn save(&mut self, provider: ProviderId, secret: &str) -> Result<()> {
        self.keys.insert(provider, secret.to_string());
        self.persist()
    }

    /// The stored secret for a provider, if any.
    pub fn get(&self, provider: ProviderId) -> Option<String> {
        self.keys.get(&provider).cloned()
    }

    /// Remove the stored secret for a provider. No-op if absent.
    pub fn clear(&mut self, provider: ProviderId) -> Result<()> {
        self.keys.remove(&provider);
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.keys)?;
        let dir = self
            .path
            .parent()
            .ok_or_else(|| Error::KeyStore("key store path has no parent".to_string()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path)
            .map_err(|e| Error::KeyStore(e.to_string()))?;
        Ok(())
    }
}
