//! The session controller: the public API of the chat client core.
//!
//! A [`Session`] composes the connection manager and the event bus into
//! the contract presentation layers consume: join, leave, send, the
//! connectivity flag, the append-only event log, and the presence roster.

use std::sync::Arc;

use banter_protocol::{ChatEvent, EventKind};
use banter_transport::{Connector, FallbackConnector};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::bus::{EventBus, Subscription};
use crate::config::ClientConfig;
use crate::connection::{ConnectionManager, ConnectionState};
use crate::error::ClientError;
use crate::presence::Roster;
use crate::validate::{validate_message, validate_username};

/// Read-model of one session: every received event plus the live roster.
#[derive(Debug, Default)]
struct SessionLog {
    messages: Vec<ChatEvent>,
    roster: Roster,
}

struct SessionInner {
    config: ClientConfig,
    bus: EventBus,
    connection: ConnectionManager,
    log: RwLock<SessionLog>,
    /// The session's own bus registrations, released at teardown.
    internal_subs: Mutex<Vec<Subscription>>,
    /// Username supplied to the active join, if any.
    current_user: Mutex<Option<String>>,
}

impl SessionInner {
    /// Fold one inbound event into the read-model.
    ///
    /// Runs on the connection manager's event-processing path, so the
    /// roster and log mutate in exactly transport arrival order.
    fn absorb(&self, event: &ChatEvent) {
        let mut log = self.log.write();
        match event.kind {
            EventKind::Join => {
                log.roster.join(event.sender.clone());
            }
            EventKind::Leave => {
                log.roster.leave(&event.sender);
            }
            EventKind::Chat => {}
        }
        log.messages.push(event.clone());
    }
}

/// A group-chat session.
///
/// Owns exactly one transport at a time. Construct one per logical
/// session; instances are independent and carry no shared global state,
/// so tests (and multi-account callers) can run sessions side by side.
///
/// Cloning is cheap and clones share the same session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Create a session that reaches the server through `connector`.
    #[must_use]
    pub fn new(config: ClientConfig, connector: Arc<dyn Connector>) -> Self {
        let bus = EventBus::new();
        let connection = ConnectionManager::new(
            connector,
            config.heartbeat.clone(),
            config.reconnect.clone(),
            bus.clone(),
        );

        Self {
            inner: Arc::new(SessionInner {
                config,
                bus,
                connection,
                log: RwLock::new(SessionLog::default()),
                internal_subs: Mutex::new(Vec::new()),
                current_user: Mutex::new(None),
            }),
        }
    }

    /// Create a session using the standard transport chain.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        Self::new(config, Arc::new(FallbackConnector::default()))
    }

    /// Join the chat as `username`.
    ///
    /// The username is validated before any network action. On success
    /// the session connects, announces the join, and optimistically adds
    /// `username` to the roster, the one permitted local insertion;
    /// every other roster change comes from the broadcast.
    ///
    /// The returned future resolves when the transport is connected, not
    /// when the server acknowledges the join: "connected" and "registered
    /// as present" are distinct states, and a caller may briefly observe
    /// the former without the latter.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for a malformed username (no
    /// transport attempt is made), or a transport/protocol error if the
    /// handshake fails.
    pub async fn join(&self, username: &str) -> Result<(), ClientError> {
        validate_username(username)?;

        self.register_internal_handlers();

        self.inner
            .connection
            .connect(&self.inner.config.endpoint)
            .await?;

        *self.inner.current_user.lock() = Some(username.to_string());

        self.inner.connection.send_event(ChatEvent::join(username))?;
        self.inner.log.write().roster.join(username);

        info!(username = %username, "Joined chat");
        Ok(())
    }

    /// Leave the chat.
    ///
    /// Announces the leave while still connected, then tears the
    /// transport down: the roster empties and every subscription handle
    /// is invalidated. Idempotent: while already disconnected nothing is
    /// announced and no events are emitted.
    pub async fn leave(&self, username: &str) {
        if self.inner.connection.is_connected() {
            if let Err(e) = self.inner.connection.send_event(ChatEvent::leave(username)) {
                debug!(error = %e, "Leave announcement not sent");
            }
            info!(username = %username, "Leaving chat");
        }

        self.inner.connection.disconnect().await;
        self.teardown();
    }

    /// Send a chat message.
    ///
    /// Content is validated and trimmed, then emitted as a single `Chat`
    /// event with a client-generated timestamp. Fire-and-forget,
    /// at-most-once: nothing is queued or retried while disconnected.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for malformed content, or
    /// [`ClientError::NotConnected`] when no link is up.
    pub fn send_message(&self, content: &str, sender: &str) -> Result<(), ClientError> {
        validate_message(content)?;

        if !self.inner.connection.is_connected() {
            return Err(ClientError::NotConnected);
        }

        self.inner
            .connection
            .send_event(ChatEvent::chat(sender, content.trim()))
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.connection.state()
    }

    /// Check whether the link is up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.connection.is_connected()
    }

    /// Snapshot of every event received this session, in arrival order.
    ///
    /// The log is append-only and re-readable; it is not replayable from
    /// the server, and a reconnect starts accruing onto the same log with
    /// no backfill.
    #[must_use]
    pub fn messages(&self) -> Vec<ChatEvent> {
        self.inner.log.read().messages.clone()
    }

    /// Sorted snapshot of the users currently believed online.
    #[must_use]
    pub fn users(&self) -> Vec<String> {
        self.inner.log.read().roster.snapshot()
    }

    /// Username of the active join, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<String> {
        self.inner.current_user.lock().clone()
    }

    /// Subscribe to inbound chat events.
    pub fn on_message(
        &self,
        callback: impl Fn(&ChatEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.bus.on_message(callback)
    }

    /// Subscribe to connectivity changes.
    pub fn on_status_change(
        &self,
        callback: impl Fn(bool) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.bus.on_status_change(callback)
    }

    /// Register the session's own presence/log maintenance on the bus.
    ///
    /// Runs once per session lifetime segment; `teardown` drops the
    /// registrations so a later join starts fresh.
    fn register_internal_handlers(&self) {
        let mut subs = self.inner.internal_subs.lock();
        if !subs.is_empty() {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        let on_message = self.inner.bus.on_message(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.absorb(event);
            }
        });

        let weak = Arc::downgrade(&self.inner);
        let on_status = self.inner.bus.on_status_change(move |connected| {
            if let Some(inner) = weak.upgrade() {
                // No server-independent roster: leaving Connected empties it
                if !connected {
                    inner.log.write().roster.clear();
                }
            }
        });

        subs.push(on_message);
        subs.push(on_status);
    }

    /// Clear the roster and invalidate every subscription handle.
    fn teardown(&self) {
        self.inner.log.write().roster.clear();
        self.inner.current_user.lock().take();

        let mut subs = self.inner.internal_subs.lock();
        for sub in subs.drain(..) {
            sub.unsubscribe();
        }
        self.inner.bus.clear();
    }
}
