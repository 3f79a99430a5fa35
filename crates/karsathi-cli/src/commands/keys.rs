//! Provider API key management commands

use std::io::{self, BufRead, Write};

use anyhow::{bail, ensure, Result};
use karsathi_core::{ProviderGateway, ProviderId};

/// Validate a key against the live provider and save it on success.
pub async fn cmd_keys_set(
    gateway: &mut ProviderGateway,
    provider: &str,
    key: Option<&str>,
) -> Result<()> {
    let provider: ProviderId = provider.parse()?;
    let secret = match key {
        Some(k) => k.to_string(),
        None => prompt_secret(provider)?,
    };
    let secret = secret.trim();
    ensure!(!secret.is_empty(), "API key must not be empty");

    print!("Validating {} key... ", provider);
    io::stdout().flush()?;

    if gateway.validate(provider, secret).await {
        println!("✅ Valid");
        gateway.save_key(provider, secret)?;
        println!("Saved. {} is now active.", provider);
        Ok(())
    } else {
        println!("❌ Invalid");
        bail!("invalid key for {}", provider);
    }
}

/// Show which providers have a key configured.
pub fn cmd_keys_status(gateway: &ProviderGateway) -> Result<()> {
    for provider in ProviderId::all() {
        let state = if gateway.key(*provider).is_some() {
            "configured"
        } else {
            "not set"
        };
        println!("  {:<8} {}", provider.to_string(), state);
    }
    Ok(())
}

/// Remove a stored key.
pub fn cmd_keys_clear(gateway: &mut ProviderGateway, provider: &str) -> Result<()> {
    let provider: ProviderId = provider.parse()?;
    gateway.clear_key(provider)?;
    println!("Cleared {} key.", provider);
    Ok(())
}

fn prompt_secret(provider: ProviderId) -> Result<String> {
    print!("Enter {} API key: ", provider);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
