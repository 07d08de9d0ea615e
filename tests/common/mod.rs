use async_trait::async_trait;
use ollachat::error::RelayError;
use ollachat::providers::{Relay, RelayResult};
use ollachat::relay::{serve_on, RelayState};
use ollachat::storage::HistoryStore;
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::net::TcpListener;

#[allow(dead_code)]
pub fn create_temp_store() -> (HistoryStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let path = tmp.path().join("chat_history.json");
    let store = HistoryStore::new_with_path(path).expect("failed to create history store");
    (store, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Relay that answers from a script and records what it was asked
#[allow(dead_code)]
#[derive(Default)]
pub struct ScriptedRelay {
    replies: Mutex<VecDeque<RelayResult<String>>>,
    calls: Mutex<Vec<(String, String)>>,
}

#[allow(dead_code)]
impl ScriptedRelay {
    pub fn new(replies: Vec<RelayResult<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(prompt, model)` pairs in call order
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Relay for ScriptedRelay {
    async fn relay(&self, prompt: &str, model: &str) -> RelayResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), model.to_string()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RelayError::Unreachable("script exhausted".to_string())))
    }

    async fn is_online(&self) -> bool {
        true
    }
}

/// Serve a relay on an ephemeral port and return its base URL
#[allow(dead_code)]
pub async fn spawn_relay(backend: Arc<dyn Relay>, default_model: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind relay listener");
    let addr = listener.local_addr().expect("listener has no address");
    let state = RelayState::new(backend, default_model);
    tokio::spawn(async move {
        let _ = serve_on(listener, state).await;
    });
    format!("http://{}", addr)
}
