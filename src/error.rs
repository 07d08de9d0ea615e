//! Error types for Ollachat
//!
//! This module defines the error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Ollachat operations
///
/// Covers configuration loading and history persistence. Library errors are
/// wrapped with `anyhow::Context` where they occur.
#[derive(Error, Debug)]
pub enum OllachatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Conversation storage errors (file read/write)
    #[error("Storage error: {0}")]
    Storage(String),

    /// The history file exists but could not be parsed.
    ///
    /// Distinct from an absent file, which simply yields an empty history.
    #[error("History file {} is corrupt: {reason}", path.display())]
    CorruptHistory {
        /// Location of the unreadable file
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// No stored conversation carries the requested id
    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    /// A positional history operation referenced a missing entry
    #[error("No conversation at index {index} (history holds {len})")]
    IndexOutOfRange {
        /// Requested position
        index: usize,
        /// Number of stored conversations
        len: usize,
    },
}

/// Failure modes of a single relay call.
///
/// Every variant ends the current turn only; callers never retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// Connection refused or reset before a response arrived
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    /// The caller-side timeout elapsed
    #[error("Backend timed out after {0}s")]
    Timeout(u64),

    /// The backend answered with a non-success status
    #[error("Backend returned status code {status}: {message}")]
    BadStatus {
        /// HTTP status code
        status: u16,
        /// Response body or error description
        message: String,
    },

    /// The backend answered 2xx but the body was not the expected JSON
    #[error("Malformed backend payload: {0}")]
    MalformedPayload(String),
}

impl RelayError {
    /// Stable snake_case tag used on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Unreachable(_) => "unreachable",
            RelayError::Timeout(_) => "timeout",
            RelayError::BadStatus { .. } => "bad_status",
            RelayError::MalformedPayload(_) => "malformed_payload",
        }
    }

    /// Inline text shown to the user in place of a reply
    pub fn user_message(&self, model: &str) -> String {
        match self {
            RelayError::Unreachable(_) => format!(
                "Cannot connect to API. Please ensure:\n\n\
                 1. The relay is running: `ollachat serve`\n\
                 2. Ollama is running: `ollama serve`\n\
                 3. Model is downloaded: `ollama pull {}`",
                model
            ),
            RelayError::Timeout(_) => "Request timed out. Please try again.".to_string(),
            RelayError::BadStatus { status, .. } => {
                format!("Error: API returned status code {}", status)
            }
            RelayError::MalformedPayload(detail) => {
                format!("Error: API returned an unreadable response ({})", detail)
            }
        }
    }
}

/// Result type alias for Ollachat operations
///
/// Uses `anyhow::Error` so callers can attach context while still being
/// able to downcast to [`OllachatError`].
pub type Result<T> = anyhow::Result<T>;
