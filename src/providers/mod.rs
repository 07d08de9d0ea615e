//! Relay implementations
//!
//! [`Relay`] is the single operation every front end needs: prompt in, text
//! out. [`OllamaBackend`] calls the model server itself; [`HttpRelayClient`]
//! goes through a running relay.

pub mod base;
pub mod ollama;
pub mod relay_client;

pub use base::{Relay, RelayResult};
pub use ollama::OllamaBackend;
pub use relay_client::HttpRelayClient;

use crate::config::Config;
use crate::error::Result;
use std::sync::Arc;

/// Build the relay a front end should use
///
/// With `direct` set the front end skips the relay server and calls the
/// model backend itself.
pub fn create_relay(config: &Config, direct: bool) -> Result<Arc<dyn Relay>> {
    if direct {
        tracing::debug!("Using direct backend at {}", config.relay.backend_url);
        Ok(Arc::new(OllamaBackend::new(&config.relay)?))
    } else {
        tracing::debug!("Using relay at {}", config.client.api_url);
        Ok(Arc::new(HttpRelayClient::new(&config.client)?))
    }
}
