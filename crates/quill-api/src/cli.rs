//! CLI command definitions for the `quill` binary.
//!
//! Uses clap derive macros. Two commands: `quill serve` runs the REST API,
//! `quill key new` mints an API key for an owner.

use clap::{Parser, Subcommand};

/// Session-aware chat relay over the Gemini API.
#[derive(Parser)]
#[command(name = "quill", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Address to bind, e.g. 127.0.0.1:8080. Defaults to the
        /// configured bind address.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Manage API keys.
    Key {
        #[command(subcommand)]
        command: KeyCommands,
    },
}

#[derive(Subcommand)]
pub enum KeyCommands {
    /// Mint a new API key for an owner. The plaintext is printed once;
    /// only its hash is stored.
    New {
        /// Owner id the key resolves to.
        owner: String,

        /// Human-readable label for the key.
        #[arg(long, default_value = "default")]
        name: String,
    },
}
