//! Configuration management for Ollachat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{OllachatError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for Ollachat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Relay server settings
    #[serde(default)]
    pub relay: RelayConfig,
    /// Settings used by front ends that talk to the relay
    #[serde(default)]
    pub client: ClientConfig,
    /// History file location
    #[serde(default)]
    pub storage: StorageConfig,
    /// Live chat behaviour
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Relay server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Address the relay listens on
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Base URL of the model-serving backend
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Model used when a request names none
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Optional timeout for backend calls (seconds). None waits indefinitely.
    #[serde(default)]
    pub backend_timeout_seconds: Option<u64>,
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_backend_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    crate::storage::DEFAULT_MODEL.to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            backend_url: default_backend_url(),
            default_model: default_model(),
            backend_timeout_seconds: None,
        }
    }
}

/// Client-side relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the relay
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Caller-side timeout for a chat turn (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Timeout for the liveness probe (seconds)
    #[serde(default = "default_health_timeout")]
    pub health_timeout_seconds: u64,

    /// Models offered in the selector
    #[serde(default = "default_models")]
    pub models: Vec<String>,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_health_timeout() -> u64 {
    1
}

fn default_models() -> Vec<String> {
    ["llama3", "llama2", "mistral", "codellama", "phi", "neural-chat"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_seconds: default_request_timeout(),
            health_timeout_seconds: default_health_timeout(),
            models: default_models(),
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_seconds)
    }
}

/// History storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// History file. Defaults to `chat_history.json` in the platform data dir.
    #[serde(default)]
    pub history_file: Option<PathBuf>,
}

/// Chat behaviour configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    /// What happens to a turn whose relay call failed
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

/// Whether failed relay turns are written into the conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Append the failure text as an assistant message
    #[default]
    Record,
    /// Drop the failed turn, including the unanswered prompt
    Discard,
}

impl FailurePolicy {
    /// Parse from a string (case-insensitive)
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "record" => Some(FailurePolicy::Record),
            "discard" => Some(FailurePolicy::Discard),
            _ => None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| OllachatError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| OllachatError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(bind) = std::env::var("OLLACHAT_BIND") {
            self.relay.bind = bind;
        }

        if let Ok(backend_url) = std::env::var("OLLACHAT_BACKEND_URL") {
            self.relay.backend_url = backend_url;
        }

        if let Ok(model) = std::env::var("OLLACHAT_DEFAULT_MODEL") {
            self.relay.default_model = model;
        }

        if let Ok(timeout) = std::env::var("OLLACHAT_BACKEND_TIMEOUT_SECONDS") {
            match timeout.parse() {
                Ok(value) => self.relay.backend_timeout_seconds = Some(value),
                Err(_) => tracing::warn!("Invalid OLLACHAT_BACKEND_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(api_url) = std::env::var("OLLACHAT_API_URL") {
            self.client.api_url = api_url;
        }

        if let Ok(timeout) = std::env::var("OLLACHAT_REQUEST_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.client.request_timeout_seconds = value;
            } else {
                tracing::warn!("Invalid OLLACHAT_REQUEST_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(history_file) = std::env::var("OLLACHAT_HISTORY_FILE") {
            tracing::debug!(history_file = %history_file, "Env override: OLLACHAT_HISTORY_FILE");
            self.storage.history_file = Some(PathBuf::from(history_file));
        }

        if let Ok(policy) = std::env::var("OLLACHAT_FAILURE_POLICY") {
            match FailurePolicy::parse_str(&policy) {
                Some(p) => self.chat.failure_policy = p,
                None => tracing::warn!(
                    "Invalid failure policy: {}, keeping {:?}",
                    policy,
                    self.chat.failure_policy
                ),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(history_file) = &cli.history_file {
            tracing::info!(
                "Using history file override from CLI: {}",
                history_file.display()
            );
            self.storage.history_file = Some(history_file.clone());
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `OllachatError::Config` naming the first invalid setting
    pub fn validate(&self) -> Result<()> {
        self.relay.bind.parse::<SocketAddr>().map_err(|e| {
            OllachatError::Config(format!("Invalid relay bind address {}: {}", self.relay.bind, e))
        })?;

        for (name, value) in [
            ("relay.backend_url", &self.relay.backend_url),
            ("client.api_url", &self.client.api_url),
        ] {
            let parsed = url::Url::parse(value)
                .map_err(|e| OllachatError::Config(format!("Invalid {} {}: {}", name, value, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(OllachatError::Config(format!(
                    "{} must use http or https, got {}",
                    name,
                    parsed.scheme()
                ))
                .into());
            }
        }

        if self.relay.default_model.trim().is_empty() {
            return Err(OllachatError::Config("default_model cannot be empty".to_string()).into());
        }

        if self.relay.backend_timeout_seconds == Some(0) {
            return Err(OllachatError::Config(
                "backend_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.client.request_timeout_seconds == 0 {
            return Err(OllachatError::Config(
                "request_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.client.health_timeout_seconds == 0 {
            return Err(OllachatError::Config(
                "health_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.client.models.is_empty() {
            return Err(OllachatError::Config("client.models cannot be empty".to_string()).into());
        }

        if !self.client.models.contains(&self.relay.default_model) {
            return Err(OllachatError::Config(format!(
                "default_model {} is not listed in client.models",
                self.relay.default_model
            ))
            .into());
        }

        Ok(())
    }
}
