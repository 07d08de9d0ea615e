//! Relay trait shared by the backend client and the HTTP relay client

use crate::error::RelayError;
use async_trait::async_trait;

/// Result of a single relay call
pub type RelayResult<T> = std::result::Result<T, RelayError>;

/// Forwards one prompt to a model and returns its complete text reply.
///
/// Implemented by [`OllamaBackend`](super::OllamaBackend), which talks to the
/// model server directly, and by [`HttpRelayClient`](super::HttpRelayClient),
/// which goes through a running `ollachat serve`. Front ends hold an
/// `Arc<dyn Relay>` and never care which one they got.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Relay: Send + Sync {
    /// Send `prompt` to `model` and wait for the full reply.
    ///
    /// An empty prompt is still forwarded. A reply without text yields an
    /// empty string rather than an error.
    ///
    /// # Errors
    ///
    /// Returns a [`RelayError`] describing why no reply was obtained
    async fn relay(&self, prompt: &str, model: &str) -> RelayResult<String>;

    /// Whether the other end currently answers at all
    async fn is_online(&self) -> bool;
}

/// Map a transport-level `reqwest` failure onto the relay taxonomy.
pub(crate) fn classify_transport_error(err: &reqwest::Error, timeout_secs: u64) -> RelayError {
    if err.is_timeout() {
        RelayError::Timeout(timeout_secs)
    } else if err.is_decode() {
        RelayError::MalformedPayload(err.to_string())
    } else {
        RelayError::Unreachable(err.to_string())
    }
}
