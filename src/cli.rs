//! Command-line interface definition for Ollachat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the relay server, the interactive chat, history
//! management, and a relay status probe.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ollachat - chat with locally served language models
///
/// Run `ollachat serve` to start the relay, then `ollachat chat` in another
/// terminal.
#[derive(Parser, Debug, Clone)]
#[command(name = "ollachat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "OLLACHAT_CONFIG", default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the history file location
    #[arg(long, global = true)]
    pub history_file: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Ollachat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the relay server in front of the model backend
    Serve {
        /// Address to listen on (overrides relay.bind)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Start an interactive chat session
    Chat {
        /// Model to start with
        #[arg(short, long)]
        model: Option<String>,

        /// Talk to the model backend directly instead of through the relay
        #[arg(long)]
        direct: bool,
    },

    /// Inspect or edit saved conversations
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Check whether the relay is reachable
    Status,
}

/// History management subcommands
///
/// Positions are 1-based, newest first, as printed by `history list`.
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List saved conversations
    List,

    /// Print one conversation
    Show {
        /// Position in the list
        index: usize,
    },

    /// Delete one conversation
    Delete {
        /// Position in the list
        index: usize,
    },

    /// Delete every saved conversation
    Clear {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            history_file: None,
            command: Commands::Status,
        }
    }
}
