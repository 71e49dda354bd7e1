//! Presence tracking for a chat session.
//!
//! The roster is the set of usernames the client currently believes to be
//! online, derived solely from observed Join/Leave events. It is cleared
//! whenever the connection drops; the client holds no server-independent
//! membership.

use std::collections::BTreeSet;
use tracing::debug;

/// Presence roster for one session.
///
/// Set semantics: duplicate joins are absorbed, and snapshots come back
/// sorted for stable display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    users: BTreeSet<String>,
}

impl Roster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of present users.
    #[must_use]
    pub fn count(&self) -> usize {
        self.users.len()
    }

    /// Check if a user is present.
    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.users.contains(username)
    }

    /// Check if the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Add a user.
    ///
    /// Returns `true` if this is a new user, `false` for a duplicate join.
    pub fn join(&mut self, username: impl Into<String>) -> bool {
        let username = username.into();
        let is_new = self.users.insert(username.clone());

        if is_new {
            debug!(username = %username, "Roster: user joined");
        }

        is_new
    }

    /// Remove a user.
    ///
    /// Returns `true` if the user was present.
    pub fn leave(&mut self, username: &str) -> bool {
        let removed = self.users.remove(username);
        if removed {
            debug!(username = %username, "Roster: user left");
        }
        removed
    }

    /// Remove every user.
    pub fn clear(&mut self) {
        if !self.users.is_empty() {
            debug!(count = self.users.len(), "Roster cleared");
            self.users.clear();
        }
    }

    /// Get a sorted snapshot of all present usernames.
    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        self.users.iter().cloned().collect()
    }
}
