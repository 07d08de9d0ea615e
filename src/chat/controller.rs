//! Chat controller
//!
//! Owns the live session and the in-memory history, and receives the relay
//! and the store from whoever builds it. Every front-end action (send, new
//! chat, load, delete, clear) goes through here.

use super::session::LiveSession;
use crate::config::FailurePolicy;
use crate::error::{OllachatError, RelayError, Result};
use crate::providers::{Relay, RelayResult};
use crate::storage::{ChatHistory, Conversation, HistoryStore};
use std::sync::Arc;
use std::time::Duration;

/// What happened to the history file after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    /// Nothing needed writing
    NotSaved,
    /// The live session was stored as a new conversation
    Inserted(String),
    /// The stored conversation was updated in place
    Updated(String),
    /// The collection was rewritten after a delete or clear
    Saved,
    /// Writing failed; the in-memory state is kept as is
    Failed(String),
}

impl SaveStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, SaveStatus::Failed(_))
    }
}

/// Result of one user turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model answered
    Replied { reply: String, save: SaveStatus },
    /// The relay failed; the turn is over and nothing was retried
    Failed {
        error: RelayError,
        /// Text shown to the user in place of a reply
        notice: String,
        /// Whether `notice` was appended to the session as an assistant message
        recorded: bool,
    },
}

/// A conversation removed from history
#[derive(Debug, Clone)]
pub struct Removal {
    pub removed: Conversation,
    /// The removed conversation was the live session, which is now reset
    pub cleared_active: bool,
    pub save: SaveStatus,
}

/// Explicit chat state plus its injected collaborators
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use ollachat::chat::{ChatController, TurnOutcome};
/// use ollachat::config::FailurePolicy;
/// use ollachat::providers::{Relay, RelayResult};
/// use ollachat::storage::{ChatHistory, HistoryStore};
/// use std::sync::Arc;
///
/// struct Shout;
///
/// #[async_trait]
/// impl Relay for Shout {
///     async fn relay(&self, prompt: &str, _model: &str) -> RelayResult<String> {
///         Ok(prompt.to_uppercase())
///     }
///
///     async fn is_online(&self) -> bool {
///         true
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let dir = tempfile::tempdir().unwrap();
/// let store = HistoryStore::new_with_path(dir.path().join("history.json")).unwrap();
/// let mut chat = ChatController::new(
///     Arc::new(Shout),
///     store,
///     ChatHistory::new(),
///     "llama3",
///     FailurePolicy::Record,
/// );
///
/// let outcome = chat.send("hi").await;
/// assert!(matches!(outcome, TurnOutcome::Replied { ref reply, .. } if reply == "HI"));
/// assert_eq!(chat.history().get(0).unwrap().title, "hi");
/// # });
/// ```
pub struct ChatController {
    relay: Arc<dyn Relay>,
    store: HistoryStore,
    history: ChatHistory,
    session: LiveSession,
    policy: FailurePolicy,
    turn_timeout: Option<Duration>,
}

impl ChatController {
    /// Build a controller around an already loaded history
    pub fn new(
        relay: Arc<dyn Relay>,
        store: HistoryStore,
        history: ChatHistory,
        model: impl Into<String>,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            relay,
            store,
            history,
            session: LiveSession::new(model),
            policy,
            turn_timeout: None,
        }
    }

    /// Load the history from `store` and build a controller
    ///
    /// # Errors
    ///
    /// Propagates `OllachatError::CorruptHistory` so the caller can decide
    /// how to recover
    pub fn open(
        relay: Arc<dyn Relay>,
        store: HistoryStore,
        model: impl Into<String>,
        policy: FailurePolicy,
    ) -> Result<Self> {
        let history = store.load()?;
        Ok(Self::new(relay, store, history, model, policy))
    }

    /// Abandon relay calls that take longer than `timeout`
    pub fn with_turn_timeout(mut self, timeout: Duration) -> Self {
        self.turn_timeout = Some(timeout);
        self
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    pub fn session(&self) -> &LiveSession {
        &self.session
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn relay(&self) -> &Arc<dyn Relay> {
        &self.relay
    }

    pub fn select_model(&mut self, model: impl Into<String>) {
        self.session.set_model(model);
    }

    /// Send one prompt and wait for the reply.
    ///
    /// On success the session is stored: inserted at the head of the history
    /// the first time it holds a complete exchange, updated in place after
    /// that. On failure the configured [`FailurePolicy`] decides whether the
    /// failure text joins the conversation.
    pub async fn send(&mut self, prompt: impl Into<String>) -> TurnOutcome {
        let prompt = prompt.into();
        let model = self.session.model().to_string();
        self.session.push_prompt(prompt.clone());

        match self.call_relay(&prompt, &model).await {
            Ok(reply) => {
                self.session.push_reply(reply.clone());
                let save = self.persist_turn();
                TurnOutcome::Replied { reply, save }
            }
            Err(error) => {
                tracing::warn!(model = %model, kind = error.kind(), "Chat turn failed: {}", error);
                let notice = error.user_message(&model);
                let recorded = match self.policy {
                    FailurePolicy::Record => {
                        self.session.push_reply(notice.clone());
                        true
                    }
                    FailurePolicy::Discard => {
                        self.session.drop_unanswered_prompt();
                        false
                    }
                };
                self.session.settle();
                TurnOutcome::Failed {
                    error,
                    notice,
                    recorded,
                }
            }
        }
    }

    /// Start over with an empty session.
    ///
    /// A session that holds messages but was never stored is saved first.
    pub fn new_chat(&mut self) -> SaveStatus {
        let save = if self.session.conversation_id().is_none() && !self.session.is_empty() {
            let conversation =
                Conversation::new(self.session.messages().to_vec(), self.session.model());
            let id = conversation.id.clone();
            self.history.insert_at_head(conversation);
            self.write(SaveStatus::Inserted(id))
        } else {
            SaveStatus::NotSaved
        };

        self.session.reset();
        save
    }

    /// Make the stored conversation at `index` the live session
    ///
    /// # Errors
    ///
    /// Returns `OllachatError::IndexOutOfRange` for a missing position
    pub fn load(&mut self, index: usize) -> Result<&Conversation> {
        let conversation = self
            .history
            .get(index)
            .ok_or_else(|| OllachatError::IndexOutOfRange {
                index,
                len: self.history.len(),
            })?;
        self.session.resume(conversation);
        tracing::debug!("Loaded conversation {}", conversation.id);
        Ok(conversation)
    }

    /// Remove the stored conversation at `index`.
    ///
    /// If it is the live session, the session is reset too.
    pub fn delete(&mut self, index: usize) -> Result<Removal> {
        let removed = self.history.remove_at(index)?;
        let cleared_active = self.session.conversation_id() == Some(removed.id.as_str());
        if cleared_active {
            self.session.reset();
        }
        let save = self.write(SaveStatus::Saved);
        Ok(Removal {
            removed,
            cleared_active,
            save,
        })
    }

    /// Drop every stored conversation and reset the session
    pub fn clear_history(&mut self) -> SaveStatus {
        self.history.clear();
        self.session.reset();
        self.write(SaveStatus::Saved)
    }

    async fn call_relay(&self, prompt: &str, model: &str) -> RelayResult<String> {
        let call = self.relay.relay(prompt, model);
        match self.turn_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or_else(|_| Err(RelayError::Timeout(limit.as_secs()))),
            None => call.await,
        }
    }

    fn persist_turn(&mut self) -> SaveStatus {
        let messages = self.session.messages().to_vec();

        match self.session.conversation_id().map(str::to_string) {
            None if messages.len() >= 2 => {
                let conversation = Conversation::new(messages, self.session.model());
                let id = conversation.id.clone();
                tracing::debug!("Saving new conversation {} ({})", id, conversation.title);
                self.history.insert_at_head(conversation);
                self.session.mark_inserted(id.clone());
                self.write(SaveStatus::Inserted(id))
            }
            None => {
                self.session.settle();
                SaveStatus::NotSaved
            }
            Some(id) => {
                if let Err(e) = self.history.update_in_place(&id, messages) {
                    tracing::warn!("Could not update conversation {}: {}", id, e);
                    self.session.settle();
                    return SaveStatus::Failed(e.to_string());
                }
                self.session.mark_updated();
                self.write(SaveStatus::Updated(id))
            }
        }
    }

    fn write(&self, on_success: SaveStatus) -> SaveStatus {
        match self.store.save(&self.history) {
            Ok(()) => on_success,
            Err(e) => {
                tracing::warn!("Failed to save chat history: {:#}", e);
                SaveStatus::Failed(format!("{:#}", e))
            }
        }
    }
}
