//! Relay Service
//!
//! A stateless HTTP front for the model backend:
//!
//! - `POST /chat` `{prompt, model?}` → `{response}`
//! - `GET /` liveness
//!
//! Backend failures come back as `502`/`504` with an [`ErrorBody`].

pub mod handlers;

pub use handlers::{ChatRequest, ChatResponse, ErrorBody};

use crate::config::RelayConfig;
use crate::error::{OllachatError, Result};
use crate::providers::{OllamaBackend, Relay};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct RelayState {
    pub backend: Arc<dyn Relay>,
    pub default_model: String,
}

impl RelayState {
    pub fn new(backend: Arc<dyn Relay>, default_model: impl Into<String>) -> Self {
        Self {
            backend,
            default_model: default_model.into(),
        }
    }
}

/// Build the relay's routes
pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/chat", post(handlers::chat))
        .with_state(state)
}

/// Serve on an already bound listener until the task is dropped
pub async fn serve_on(listener: TcpListener, state: RelayState) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!("Relay listening on http://{}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Bind `config.bind` and relay to the configured Ollama backend
pub async fn serve(config: &RelayConfig) -> Result<()> {
    let addr: SocketAddr = config
        .bind
        .parse()
        .map_err(|e| {
            OllachatError::Config(format!("Invalid bind address {}: {}", config.bind, e))
        })?;

    let backend = Arc::new(OllamaBackend::new(config)?);
    let state = RelayState::new(backend, config.default_model.clone());

    let listener = TcpListener::bind(addr).await?;
    serve_on(listener, state).await
}
