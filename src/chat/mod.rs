//! Live chat state
//!
//! [`LiveSession`] is the conversation being typed into right now;
//! [`ChatController`] ties it to the stored history and to a relay.

pub mod controller;
pub mod session;

pub use controller::{ChatController, Removal, SaveStatus, TurnOutcome};
pub use session::{LiveSession, SessionPhase};

/// Suggestions shown when a session has no messages yet
pub const STARTER_PROMPTS: [&str; 3] = [
    "Explain quantum computing",
    "Write a Python function",
    "Help me debug code",
];
