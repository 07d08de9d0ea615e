//! HTTP client for a running relay (`ollachat serve`)

use crate::config::ClientConfig;
use crate::error::{OllachatError, RelayError, Result};
use crate::providers::base::{classify_transport_error, Relay, RelayResult};
use crate::relay::{ChatRequest, ChatResponse, ErrorBody};

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Talks to the relay's `POST /chat` and `GET /` endpoints
///
/// The request timeout bounds each chat turn; on expiry the call is
/// abandoned and reported as [`RelayError::Timeout`].
pub struct HttpRelayClient {
    client: Client,
    api_url: String,
    request_timeout: Duration,
    health_timeout: Duration,
}

impl HttpRelayClient {
    /// Create a client from the client section of the configuration
    ///
    /// # Examples
    ///
    /// ```
    /// use ollachat::config::ClientConfig;
    /// use ollachat::providers::HttpRelayClient;
    ///
    /// let client = HttpRelayClient::new(&ClientConfig::default()).unwrap();
    /// assert_eq!(client.chat_url(), "http://localhost:8000/chat");
    /// ```
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ollachat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OllachatError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout(),
            health_timeout: config.health_timeout(),
        })
    }

    pub fn chat_url(&self) -> String {
        format!("{}/chat", self.api_url)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl Relay for HttpRelayClient {
    async fn relay(&self, prompt: &str, model: &str) -> RelayResult<String> {
        let timeout_secs = self.request_timeout.as_secs();
        let request = ChatRequest {
            prompt: prompt.to_string(),
            model: Some(model.to_string()),
        };

        let response = self
            .client
            .post(self.chat_url())
            .timeout(self.request_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| classify_transport_error(&e, timeout_secs))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| classify_transport_error(&e, timeout_secs))?;

        if !status.is_success() {
            tracing::warn!("Relay returned {}: {}", status, text);
            return Err(error_from_body(status.as_u16(), text, timeout_secs));
        }

        serde_json::from_str::<ChatResponse>(&text)
            .map(|body| body.response)
            .map_err(|e| RelayError::MalformedPayload(e.to_string()))
    }

    async fn is_online(&self) -> bool {
        match self
            .client
            .get(format!("{}/", self.api_url))
            .timeout(self.health_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Relay liveness probe failed: {}", e);
                false
            }
        }
    }
}

/// Rebuild the typed failure from a relay error reply
///
/// Bodies without a recognised `kind` are reported as `BadStatus`.
fn error_from_body(status: u16, text: String, timeout_secs: u64) -> RelayError {
    let Ok(body) = serde_json::from_str::<ErrorBody>(&text) else {
        return RelayError::BadStatus {
            status,
            message: text,
        };
    };

    match body.kind.as_str() {
        "unreachable" => RelayError::Unreachable(body.error),
        "timeout" => RelayError::Timeout(timeout_secs),
        "malformed_payload" => RelayError::MalformedPayload(body.error),
        _ => RelayError::BadStatus {
            status,
            message: body.error,
        },
    }
}
