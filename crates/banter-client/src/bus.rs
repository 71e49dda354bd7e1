//! In-process event bus for inbound chat events and connectivity changes.
//!
//! Handlers run in registration order on the connection manager's
//! event-processing path. Delivery is fire-and-forget, at-most-once:
//! nothing is queued while disconnected, and nothing is replayed after a
//! reconnect.

use banter_protocol::ChatEvent;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::trace;

type MessageCallback = Arc<dyn Fn(&ChatEvent) + Send + Sync>;
type StatusCallback = Arc<dyn Fn(bool) + Send + Sync>;

#[derive(Debug, Clone, Copy)]
enum HandlerKind {
    Message,
    Status,
}

#[derive(Default)]
struct BusInner {
    next_id: AtomicU64,
    messages: Mutex<Vec<(u64, MessageCallback)>>,
    statuses: Mutex<Vec<(u64, StatusCallback)>>,
}

/// Typed pub/sub fan-out for session events.
///
/// Cloning is cheap and clones share the same registrations.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

/// Handle pairing one registration with its disposer.
///
/// Registrations are keyed by a monotonic id, so the same closure
/// registered twice is two independent subscriptions. Dropping the handle
/// does not unsubscribe; call [`Subscription::unsubscribe`] explicitly.
pub struct Subscription {
    bus: Weak<BusInner>,
    id: u64,
    kind: HandlerKind,
}

impl Subscription {
    /// Remove exactly this registration.
    ///
    /// Idempotent: a second call (or a call after the bus was cleared)
    /// does nothing.
    pub fn unsubscribe(&self) {
        let Some(bus) = self.bus.upgrade() else {
            return;
        };

        match self.kind {
            HandlerKind::Message => bus.messages.lock().retain(|(id, _)| *id != self.id),
            HandlerKind::Status => bus.statuses.lock().retain(|(id, _)| *id != self.id),
        }
    }
}

impl EventBus {
    /// Create a new bus with no registrations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler invoked once per inbound [`ChatEvent`], in
    /// strict arrival order for the lifetime of one connection instance.
    ///
    /// No ordering guarantee is made across a reconnect.
    pub fn on_message(
        &self,
        callback: impl Fn(&ChatEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.messages.lock().push((id, Arc::new(callback)));

        Subscription {
            bus: Arc::downgrade(&self.inner),
            id,
            kind: HandlerKind::Message,
        }
    }

    /// Register a handler invoked with the new boolean connectivity on
    /// every state transition.
    pub fn on_status_change(
        &self,
        callback: impl Fn(bool) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.statuses.lock().push((id, Arc::new(callback)));

        Subscription {
            bus: Arc::downgrade(&self.inner),
            id,
            kind: HandlerKind::Status,
        }
    }

    /// Deliver one inbound event to every message handler.
    pub fn publish_message(&self, event: &ChatEvent) {
        trace!(kind = ?event.kind, sender = %event.sender, "Dispatching event");

        // Snapshot under the lock, invoke outside it, so a handler may
        // subscribe or unsubscribe during dispatch.
        let handlers: Vec<MessageCallback> = self
            .inner
            .messages
            .lock()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for handler in handlers {
            handler(event);
        }
    }

    /// Deliver a connectivity change to every status handler.
    pub fn publish_status(&self, connected: bool) {
        trace!(connected, "Dispatching status change");

        let handlers: Vec<StatusCallback> = self
            .inner
            .statuses
            .lock()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for handler in handlers {
            handler(connected);
        }
    }

    /// Number of live message registrations.
    #[must_use]
    pub fn message_subscriber_count(&self) -> usize {
        self.inner.messages.lock().len()
    }

    /// Number of live status registrations.
    #[must_use]
    pub fn status_subscriber_count(&self) -> usize {
        self.inner.statuses.lock().len()
    }

    /// Drop every registration; outstanding handles become inert.
    pub fn clear(&self) {
        self.inner.messages.lock().clear();
        self.inner.statuses.lock().clear();
    }
}
