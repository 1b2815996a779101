//! CLI argument definitions using clap
//!
//! Commands:
//! - rebac-store encode --namespace <ns> --resource <name> --relationship <rel>
//! - rebac-store decode <packed>
//! - rebac-store tick <name>
//! - rebac-store dump
//!
//! Every command accepts `--config <path>`; without it the defaults apply.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rebac-store - versioned document store and key encoder
#[derive(Parser, Debug)]
#[command(name = "rebac-store")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pack a (resource, relationship) pair, allocating IDs as needed
    Encode {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        namespace: String,

        #[arg(long)]
        resource: String,

        #[arg(long)]
        relationship: String,
    },

    /// Resolve a packed key back to its names
    Decode {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Packed key, decimal or 0x-prefixed hex
        packed: String,
    },

    /// Advance a named counter and print the new value
    Tick {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        name: String,
    },

    /// Print every dictionary entry and counter
    Dump {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Command {
    pub fn config_path(&self) -> Option<&PathBuf> {
        match self {
            Command::Encode { config, .. }
            | Command::Decode { config, .. }
            | Command::Tick { config, .. }
            | Command::Dump { config } => config.as_ref(),
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
