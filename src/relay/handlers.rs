//! Request handlers and wire types for the relay

use super::RelayState;
use crate::error::RelayError;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Body of `POST /chat`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Successful reply of `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: String,
}

/// Error reply of `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: String,
}

/// A backend failure rendered as an HTTP response
#[derive(Debug)]
pub struct RelayFailure(pub RelayError);

impl RelayFailure {
    fn status(&self) -> StatusCode {
        match self.0 {
            RelayError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            RelayError::Unreachable(_)
            | RelayError::BadStatus { .. }
            | RelayError::MalformedPayload(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for RelayFailure {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.0.to_string(),
            kind: self.0.kind().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// `GET /`
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "ollachat",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `POST /chat`
///
/// The body is parsed as JSON whatever `Content-Type` says.
pub async fn chat(State(state): State<RelayState>, body: Bytes) -> Response {
    let request: ChatRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!("Rejected chat request body: {}", e);
            let body = ErrorBody {
                error: format!("Invalid request body: {}", e),
                kind: "invalid_request".to_string(),
            };
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    let model = request.model.unwrap_or_else(|| state.default_model.clone());

    tracing::info!(
        model = %model,
        prompt_chars = request.prompt.chars().count(),
        "Relaying chat request"
    );

    match state.backend.relay(&request.prompt, &model).await {
        Ok(response) => Json(ChatResponse { response }).into_response(),
        Err(e) => {
            tracing::warn!(model = %model, kind = e.kind(), "Relay failed: {}", e);
            RelayFailure(e).into_response()
        }
    }
}
