//! Ollachat - chat with locally served language models
//!
//! This library provides a small relay in front of an Ollama server, the
//! flat-file conversation history, and the chat state that terminal front
//! ends drive.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `relay`: HTTP relay service (`POST /chat`, `GET /`)
//! - `providers`: the `Relay` trait and its Ollama and HTTP implementations
//! - `storage`: conversation data model and the JSON history file
//! - `chat`: live session state and the controller that persists it
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//! - `commands`: handlers behind each CLI command
//!
//! # Example
//!
//! ```no_run
//! use ollachat::Config;
//! use ollachat::providers::create_relay;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let relay = create_relay(&config, false)?;
//!     let reply = relay.relay("Explain quantum computing", "llama3").await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod providers;
pub mod relay;
pub mod storage;

// Re-export commonly used types
pub use chat::{ChatController, LiveSession, SessionPhase};
pub use config::Config;
pub use error::{OllachatError, RelayError, Result};
pub use storage::{ChatHistory, Conversation, HistoryStore, Message, Role};

#[cfg(test)]
pub mod test_utils;
