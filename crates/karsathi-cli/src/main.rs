//! KarSathi CLI - Indian income-tax chat assistant
//!
//! Usage:
//!   karsathi                         Start an interactive chat session
//!   karsathi calc --income 800000    One-shot tax calculation
//!   karsathi keys set openai         Validate and save a provider API key
//!   karsathi keys status             Show configured providers

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let data_dir = cli.data_dir.as_deref();

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let gateway = commands::open_gateway(data_dir)?;
            commands::cmd_chat(&gateway).await
        }
        Commands::Calc {
            income,
            regime,
            deductions,
        } => commands::cmd_calc(&income, &regime, &deductions),
        Commands::Keys { action } => match action {
            KeysAction::Set { provider, key } => {
                let mut gateway = commands::open_gateway(data_dir)?;
                commands::cmd_keys_set(&mut gateway, &provider, key.as_deref()).await
            }
            KeysAction::Status => {
                let gateway = commands::open_gateway(data_dir)?;
                commands::cmd_keys_status(&gateway)
            }
            KeysAction::Clear { provider } => {
                let mut gateway = commands::open_gateway(data_dir)?;
                commands::cmd_keys_clear(&mut gateway, &provider)
            }
        },
    }
}
