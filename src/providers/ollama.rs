//! Ollama backend client
//!
//! Calls Ollama's `/api/generate` endpoint with streaming disabled and
//! returns the `response` field of the single JSON reply.

use crate::config::RelayConfig;
use crate::error::{OllachatError, RelayError, Result};
use crate::providers::base::{classify_transport_error, Relay, RelayResult};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Direct client for an Ollama server
///
/// # Examples
///
/// ```no_run
/// use ollachat::config::RelayConfig;
/// use ollachat::providers::{OllamaBackend, Relay};
///
/// # async fn example() -> ollachat::error::Result<()> {
/// let backend = OllamaBackend::new(&RelayConfig::default())?;
/// let text = backend.relay("Explain quantum computing", "llama3").await?;
/// println!("{}", text);
/// # Ok(())
/// # }
/// ```
pub struct OllamaBackend {
    client: Client,
    host: String,
    timeout_seconds: Option<u64>,
}

/// Request body for `/api/generate`
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response body from `/api/generate`; everything but `response` is ignored
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

impl OllamaBackend {
    /// Create a new backend client from relay configuration
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &RelayConfig) -> Result<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("ollachat/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.backend_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| OllachatError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Ollama backend: host={}, timeout={:?}",
            config.backend_url,
            config.backend_timeout_seconds
        );

        Ok(Self {
            client,
            host: config.backend_url.trim_end_matches('/').to_string(),
            timeout_seconds: config.backend_timeout_seconds,
        })
    }

    /// Get the configured Ollama host
    pub fn host(&self) -> &str {
        &self.host
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.host)
    }
}

#[async_trait]
impl Relay for OllamaBackend {
    async fn relay(&self, prompt: &str, model: &str) -> RelayResult<String> {
        let url = self.generate_url();
        let body = GenerateRequest {
            model,
            prompt,
            stream: false,
        };

        tracing::debug!(model = %model, prompt_chars = prompt.chars().count(), "POST {}", url);

        let timeout = self.timeout_seconds.unwrap_or_default();
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Failed to reach Ollama at {}: {}", url, e);
                classify_transport_error(&e, timeout)
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| classify_transport_error(&e, timeout))?;

        if !status.is_success() {
            tracing::error!("Ollama returned error {}: {}", status, text);
            return Err(RelayError::BadStatus {
                status: status.as_u16(),
                message: text,
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Failed to parse Ollama response: {}", e);
            RelayError::MalformedPayload(e.to_string())
        })?;

        Ok(parsed.response.unwrap_or_default())
    }

    async fn is_online(&self) -> bool {
        self.client
            .get(format!("{}/", self.host))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}
