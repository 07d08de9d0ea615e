use crate::error::{OllachatError, Result};
use anyhow::Context;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub mod types;
pub use types::{
    derive_preview, derive_title, new_conversation_id, ChatHistory, Conversation, Message, Role,
    DEFAULT_MODEL, EMPTY_CHAT_PREVIEW, NEW_CHAT_TITLE,
};

/// File name used inside the platform data directory
pub const HISTORY_FILE_NAME: &str = "chat_history.json";

/// Flat-file storage backend for conversation history
///
/// The whole collection lives in a single JSON array that is read once at
/// startup and rewritten wholesale on every mutation. There is no locking;
/// with two writers the last one wins.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Create a store in the user's data directory
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "ollachat", "ollachat")
            .ok_or_else(|| OllachatError::Storage("Could not determine data directory".into()))?;

        Self::new_with_path(proj_dirs.data_dir().join(HISTORY_FILE_NAME))
    }

    /// Create a store that uses the specified file.
    ///
    /// The parent directory is created if missing; the file itself is only
    /// written on the first save.
    ///
    /// # Examples
    ///
    /// ```
    /// use ollachat::storage::HistoryStore;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = HistoryStore::new_with_path(dir.path().join("history.json")).unwrap();
    /// assert!(store.load().unwrap().is_empty());
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create parent directory for history file")
                    .map_err(|e| OllachatError::Storage(e.to_string()))?;
            }
        }

        Ok(Self { path })
    }

    /// Open the configured file, or the data-directory default
    pub fn from_optional_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::new_with_path(p),
            None => Self::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted collection
    ///
    /// An absent file is an empty history.
    ///
    /// # Errors
    ///
    /// Returns `OllachatError::CorruptHistory` if the file exists but does not
    /// parse, and `OllachatError::Storage` if it cannot be read.
    pub fn load(&self) -> Result<ChatHistory> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No history file at {}", self.path.display());
                return Ok(ChatHistory::new());
            }
            Err(e) => {
                return Err(OllachatError::Storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                ))
                .into())
            }
        };

        let history: ChatHistory =
            serde_json::from_str(&contents).map_err(|e| OllachatError::CorruptHistory {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!(
            "Loaded {} conversations from {}",
            history.len(),
            self.path.display()
        );
        Ok(history)
    }

    /// Overwrite the file with the full collection
    ///
    /// Writes a sibling temp file and renames it over the target, so a
    /// failed write never leaves a half-written history behind.
    pub fn save(&self, history: &ChatHistory) -> Result<()> {
        let json = serde_json::to_string_pretty(history)
            .context("Failed to serialize history")
            .map_err(|e| OllachatError::Storage(e.to_string()))?;

        let tmp_path = self.tmp_path();
        std::fs::write(&tmp_path, json)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))
            .map_err(|e| OllachatError::Storage(format!("{:#}", e)))?;

        if let Err(e) = std::fs::rename(&tmp_path, &self.path) {
            if let Err(cleanup) = std::fs::remove_file(&tmp_path) {
                tracing::debug!("Could not remove {}: {}", tmp_path.display(), cleanup);
            }
            return Err(OllachatError::Storage(format!(
                "Failed to replace {}: {}",
                self.path.display(),
                e
            ))
            .into());
        }

        tracing::debug!(
            "Saved {} conversations to {}",
            history.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Move an unreadable history file aside so a fresh one can be started.
    ///
    /// The target is `<file>.corrupt`, or `<file>.corrupt.N` with the first
    /// free `N` when earlier copies exist. Returns where the file went.
    pub fn quarantine_corrupt(&self) -> Result<PathBuf> {
        let target = self.free_corrupt_path();
        std::fs::rename(&self.path, &target)
            .with_context(|| format!("Failed to move {} aside", self.path.display()))
            .map_err(|e| OllachatError::Storage(format!("{:#}", e)))?;
        tracing::warn!(
            "Moved corrupt history {} to {}",
            self.path.display(),
            target.display()
        );
        Ok(target)
    }

    fn free_corrupt_path(&self) -> PathBuf {
        let base = with_suffix(&self.path, ".corrupt");
        if !base.exists() {
            return base;
        }
        (1u32..)
            .map(|n| with_suffix(&base, &format!(".{}", n)))
            .find(|candidate| !candidate.exists())
            .unwrap_or(base)
    }

    fn tmp_path(&self) -> PathBuf {
        with_suffix(&self.path, ".tmp")
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}
