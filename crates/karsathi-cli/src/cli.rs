//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// KarSathi - Indian income-tax chat assistant
#[derive(Parser)]
#[command(name = "karsathi")]
#[command(about = "Chat assistant for Indian income-tax questions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data directory for stored API keys (defaults to the platform data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat session (the default)
    Chat,

    /// Calculate tax for a given income without starting a chat
    Calc {
        /// Annual income in rupees (grouped input like 8,00,000 is fine)
        #[arg(short, long)]
        income: String,

        /// Tax regime: new or old
        #[arg(short, long, default_value = "new")]
        regime: String,

        /// Total deductions in rupees (old regime only)
        #[arg(short, long, default_value = "0")]
        deductions: String,
    },

    /// Manage provider API keys
    Keys {
        #[command(subcommand)]
        action: KeysAction,
    },
}

#[derive(Subcommand)]
pub enum KeysAction {
    /// Validate and save an API key for a provider
    Set {
        /// Provider: openai or gemini
        provider: String,

        /// The API key (prompted for if omitted)
        #[arg(long)]
        key: Option<String>,
    },

    /// Show which providers have a key configured
    Status,

    /// Remove a stored API key
    Clear {
        /// Provider: openai or gemini
        provider: String,
    },
}
