//! Test utilities for Ollachat
//!
//! Temporary directories, canned conversations, and assertion helpers shared
//! by the unit tests.

use crate::config::Config;
use crate::storage::{ChatHistory, Conversation, HistoryStore, Message};
use std::fmt::Display;
use tempfile::TempDir;

/// Create a temporary directory that is removed when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a store backed by a file inside a fresh temp directory
///
/// The `TempDir` is returned so the caller keeps it alive.
pub fn temp_store() -> (HistoryStore, TempDir) {
    let dir = temp_dir();
    let store = HistoryStore::new_with_path(dir.path().join("chat_history.json"))
        .expect("Failed to create history store");
    (store, dir)
}

/// Build a finished two-message conversation
pub fn sample_conversation(prompt: &str, reply: &str) -> Conversation {
    Conversation::new(
        vec![Message::user(prompt), Message::assistant(reply)],
        "llama3",
    )
}

/// History with the given prompts, the last one newest
pub fn sample_history(prompts: &[&str]) -> ChatHistory {
    let mut history = ChatHistory::new();
    for prompt in prompts {
        history.insert_at_head(sample_conversation(prompt, "ok"));
    }
    history
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T, E: Display>(result: Result<T, E>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// A complete YAML configuration
pub fn test_config_yaml() -> String {
    r#"
relay:
  bind: "127.0.0.1:8800"
  backend_url: "http://localhost:11434"
  default_model: llama3
client:
  api_url: "http://127.0.0.1:8800"
  request_timeout_seconds: 60
  health_timeout_seconds: 1
  models: [llama3, mistral]
chat:
  failure_policy: record
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OllachatError;

    #[test]
    fn test_temp_store_starts_empty() {
        let (store, _dir) = temp_store();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_sample_history_newest_first() {
        let history = sample_history(&["first", "second"]);
        assert_eq!(history.get(0).unwrap().title, "second");
        assert_eq!(history.get(1).unwrap().title, "first");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<(), OllachatError> =
            Err(OllachatError::Config("test error message".to_string()));
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        let result: Result<(), OllachatError> = Ok(());
        assert_error_contains(result, "error");
    }

    #[test]
    #[should_panic(expected = "does not contain")]
    fn test_assert_error_contains_wrong_message() {
        let result: Result<(), OllachatError> =
            Err(OllachatError::Config("different error".to_string()));
        assert_error_contains(result, "not present");
    }

    #[test]
    fn test_test_config_yaml() {
        let config: Config = serde_yaml::from_str(&test_config_yaml()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.client.models, vec!["llama3", "mistral"]);
    }
}
