//! Live session state
//!
//! The in-memory chat that the user is currently typing into. It becomes a
//! stored [`Conversation`] once the first exchange completes; until then it
//! exists only in this process.

use crate::storage::{Conversation, Message, Role};
use std::fmt;

/// Where a live session is in its lifecycle
///
/// ```text
/// Empty -> AwaitingReply -> SavedNew -> AwaitingReply -> SavedUpdating -> ...
/// ```
///
/// A failed turn settles back into `Unsaved` (messages but no id) or
/// `SavedUpdating`. "New chat" returns to `Empty`; loading a stored
/// conversation jumps straight to `SavedUpdating`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No messages and no id
    Empty,
    /// A user message was sent and no reply has arrived yet
    AwaitingReply,
    /// Holds messages that have never been stored
    Unsaved,
    /// Just inserted into the store
    SavedNew,
    /// Backed by a stored conversation that is updated each turn
    SavedUpdating,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Empty => "empty",
            SessionPhase::AwaitingReply => "awaiting reply",
            SessionPhase::Unsaved => "unsaved",
            SessionPhase::SavedNew => "saved",
            SessionPhase::SavedUpdating => "saved (updating)",
        };
        write!(f, "{}", name)
    }
}

/// Current message list, the id of the stored conversation it belongs to,
/// and the selected model.
#[derive(Debug, Clone)]
pub struct LiveSession {
    messages: Vec<Message>,
    conversation_id: Option<String>,
    model: String,
    phase: SessionPhase,
}

impl LiveSession {
    /// Start an empty session using `model`
    ///
    /// # Examples
    ///
    /// ```
    /// use ollachat::chat::{LiveSession, SessionPhase};
    ///
    /// let session = LiveSession::new("llama3");
    /// assert_eq!(session.phase(), SessionPhase::Empty);
    /// assert!(session.conversation_id().is_none());
    /// ```
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            conversation_id: None,
            model: model.into(),
            phase: SessionPhase::Empty,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    /// Append the user's prompt; the session now waits for a reply
    pub(crate) fn push_prompt(&mut self, prompt: impl Into<String>) {
        self.messages.push(Message::user(prompt));
        self.phase = SessionPhase::AwaitingReply;
    }

    pub(crate) fn push_reply(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Drop the trailing prompt if it never got an answer
    pub(crate) fn drop_unanswered_prompt(&mut self) {
        if self.messages.last().map(|m| m.role) == Some(Role::User) {
            self.messages.pop();
        }
    }

    /// Settle after a turn that did not touch the store
    pub(crate) fn settle(&mut self) {
        self.phase = match (&self.conversation_id, self.messages.is_empty()) {
            (Some(_), _) => SessionPhase::SavedUpdating,
            (None, true) => SessionPhase::Empty,
            (None, false) => SessionPhase::Unsaved,
        };
    }

    pub(crate) fn mark_inserted(&mut self, id: String) {
        self.conversation_id = Some(id);
        self.phase = SessionPhase::SavedNew;
    }

    pub(crate) fn mark_updated(&mut self) {
        self.phase = SessionPhase::SavedUpdating;
    }

    /// Forget messages and id; the selected model is kept
    pub fn reset(&mut self) {
        self.messages.clear();
        self.conversation_id = None;
        self.phase = SessionPhase::Empty;
    }

    /// Continue a stored conversation with its id and model
    pub fn resume(&mut self, conversation: &Conversation) {
        self.messages = conversation.messages.clone();
        self.conversation_id = Some(conversation.id.clone());
        self.model = conversation.model.clone();
        self.phase = SessionPhase::SavedUpdating;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_moves_to_awaiting_reply() {
        let mut session = LiveSession::new("llama3");
        session.push_prompt("hi");
        assert_eq!(session.phase(), SessionPhase::AwaitingReply);
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn test_settle_without_id() {
        let mut session = LiveSession::new("llama3");
        session.push_prompt("hi");
        session.push_reply("failed");
        session.settle();
        assert_eq!(session.phase(), SessionPhase::Unsaved);

        session.reset();
        session.settle();
        assert_eq!(session.phase(), SessionPhase::Empty);
    }

    #[test]
    fn test_drop_unanswered_prompt_only_removes_user_tail() {
        let mut session = LiveSession::new("llama3");
        session.push_prompt("hi");
        session.push_reply("hello");
        session.drop_unanswered_prompt();
        assert_eq!(session.messages().len(), 2);

        session.push_prompt("again");
        session.drop_unanswered_prompt();
        assert_eq!(session.messages().len(), 2);
    }

    #[test]
    fn test_reset_keeps_model() {
        let mut session = LiveSession::new("mistral");
        session.push_prompt("hi");
        session.mark_inserted("01ABC".to_string());
        session.reset();
        assert_eq!(session.phase(), SessionPhase::Empty);
        assert!(session.conversation_id().is_none());
        assert!(session.is_empty());
        assert_eq!(session.model(), "mistral");
    }

    #[test]
    fn test_resume_takes_id_and_model() {
        let conversation = Conversation::new(
            vec![Message::user("hi"), Message::assistant("hello")],
            "codellama",
        );
        let mut session = LiveSession::new("llama3");
        session.resume(&conversation);
        assert_eq!(session.phase(), SessionPhase::SavedUpdating);
        assert_eq!(session.conversation_id(), Some(conversation.id.as_str()));
        assert_eq!(session.model(), "codellama");
        assert_eq!(session.messages().len(), 2);
    }
}
