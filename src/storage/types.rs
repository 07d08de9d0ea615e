//! Conversation data model and the pure helpers that derive display text
//! from it.

use crate::error::{OllachatError, Result};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Title used when a conversation has no user message yet
pub const NEW_CHAT_TITLE: &str = "New Chat";

/// Preview used for a conversation without messages
pub const EMPTY_CHAT_PREVIEW: &str = "Empty chat";

/// Title assumed for stored records that lack one
pub const UNTITLED_CHAT: &str = "Untitled Chat";

/// Model assumed when none is given
pub const DEFAULT_MODEL: &str = "llama3";

const TITLE_MAX_CHARS: usize = 50;
const PREVIEW_MAX_CHARS: usize = 60;
const ELLIPSIS: char = '…';

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the person chatting
    User,
    /// Produced by the model (or a recorded relay failure)
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One turn in a conversation
///
/// # Examples
///
/// ```
/// use ollachat::storage::{Message, Role};
///
/// let msg = Message::user("Explain quantum computing");
/// assert_eq!(msg.role, Role::User);
/// assert_eq!(msg.timestamp.len(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Wall-clock time at creation, `HH:MM`
    #[serde(default)]
    pub timestamp: String,
}

impl Message {
    /// Create a message stamped with the current local time
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Local::now().format("%H:%M").to_string(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// One saved chat session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default = "default_model")]
    pub model: String,
    pub created_at: NaiveDateTime,
}

fn default_title() -> String {
    UNTITLED_CHAT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Conversation {
    /// Build a new conversation from a message list, assigning a fresh id
    /// and deriving the title.
    pub fn new(messages: Vec<Message>, model: impl Into<String>) -> Self {
        Self {
            id: new_conversation_id(),
            title: derive_title(&messages),
            messages,
            model: model.into(),
            created_at: Local::now().naive_local(),
        }
    }

    /// Replace the message list and re-derive the title
    pub fn replace_messages(&mut self, messages: Vec<Message>) {
        self.title = derive_title(&messages);
        self.messages = messages;
    }

    /// Preview of the last message
    pub fn preview(&self) -> String {
        derive_preview(&self.messages)
    }
}

/// Generate a new conversation id
///
/// ULIDs start with a millisecond timestamp, so ids still sort by creation
/// time, and the random suffix keeps ids created in the same instant apart.
pub fn new_conversation_id() -> String {
    Ulid::new().to_string()
}

/// Title for a message list: the first user message, cut at 50 characters.
///
/// # Examples
///
/// ```
/// use ollachat::storage::{derive_title, Message};
///
/// let messages = vec![Message::user("Explain quantum computing")];
/// assert_eq!(derive_title(&messages), "Explain quantum computing");
/// assert_eq!(derive_title(&[]), "New Chat");
/// ```
pub fn derive_title(messages: &[Message]) -> String {
    messages
        .iter()
        .find(|m| m.role == Role::User)
        .map(|m| truncate_chars(&m.content, TITLE_MAX_CHARS))
        .unwrap_or_else(|| NEW_CHAT_TITLE.to_string())
}

/// Preview for a message list: the last message, cut at 60 characters.
pub fn derive_preview(messages: &[Message]) -> String {
    messages
        .last()
        .map(|m| truncate_chars(&m.content, PREVIEW_MAX_CHARS))
        .unwrap_or_else(|| EMPTY_CHAT_PREVIEW.to_string())
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => {
            let mut out = text[..cut].to_string();
            out.push(ELLIPSIS);
            out
        }
        None => text.to_string(),
    }
}

/// Ordered collection of conversations, newest first
///
/// Serialized as a bare JSON array. Position reflects creation order only;
/// updating a conversation never moves it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatHistory {
    conversations: Vec<Conversation>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Conversation> {
        self.conversations.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Conversation> {
        self.conversations.get(index)
    }

    /// Prepend a conversation. Ids are not deduplicated.
    pub fn insert_at_head(&mut self, conversation: Conversation) {
        self.conversations.insert(0, conversation);
    }

    /// Remove and return the conversation at `index`
    ///
    /// # Errors
    ///
    /// Returns `OllachatError::IndexOutOfRange` if `index` is past the end
    pub fn remove_at(&mut self, index: usize) -> Result<Conversation> {
        if index >= self.conversations.len() {
            return Err(OllachatError::IndexOutOfRange {
                index,
                len: self.conversations.len(),
            }
            .into());
        }
        Ok(self.conversations.remove(index))
    }

    /// Replace the messages of the first conversation with `id` and
    /// re-derive its title.
    ///
    /// # Errors
    ///
    /// Returns `OllachatError::ConversationNotFound` when no entry matches
    pub fn update_in_place(&mut self, id: &str, messages: Vec<Message>) -> Result<()> {
        let conversation = self
            .conversations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| OllachatError::ConversationNotFound(id.to_string()))?;
        conversation.replace_messages(messages);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.conversations.clear();
    }
}

impl From<Vec<Conversation>> for ChatHistory {
    fn from(conversations: Vec<Conversation>) -> Self {
        Self { conversations }
    }
}
