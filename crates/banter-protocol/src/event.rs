//! Event types for the Banter protocol.
//!
//! Events are the fundamental unit of communication: every frame on the
//! wire is exactly one JSON-encoded [`ChatEvent`].

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Event kind identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Regular chat message between users.
    #[serde(rename = "CHAT")]
    Chat,
    /// A user joined the chat.
    #[serde(rename = "JOIN")]
    Join,
    /// A user left the chat.
    #[serde(rename = "LEAVE")]
    Leave,
}

impl EventKind {
    /// Check whether this kind affects the presence roster.
    #[must_use]
    pub fn is_presence(self) -> bool {
        matches!(self, EventKind::Join | EventKind::Leave)
    }
}

/// Current time as integer epoch milliseconds.
#[must_use]
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

/// A single chat event.
///
/// Immutable once constructed. `content` is empty for `Join`/`Leave`
/// events as emitted by clients; the server may fill in announcement text
/// on the broadcast copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    /// What kind of event this is.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Username of the originating user.
    pub sender: String,
    /// Message text. Empty for presence events.
    pub content: String,
    /// Client-generated creation time, epoch milliseconds.
    pub timestamp: u64,
}

impl ChatEvent {
    /// Create a new event stamped with the current time.
    #[must_use]
    pub fn new(kind: EventKind, sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind,
            sender: sender.into(),
            content: content.into(),
            timestamp: epoch_millis(),
        }
    }

    /// Create a new `Chat` event.
    #[must_use]
    pub fn chat(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(EventKind::Chat, sender, content)
    }

    /// Create a new `Join` event.
    #[must_use]
    pub fn join(sender: impl Into<String>) -> Self {
        Self::new(EventKind::Join, sender, "")
    }

    /// Create a new `Leave` event.
    #[must_use]
    pub fn leave(sender: impl Into<String>) -> Self {
        Self::new(EventKind::Leave, sender, "")
    }

    /// Override the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }
}
