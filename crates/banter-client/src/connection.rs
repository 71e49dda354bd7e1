//! Connection lifecycle management.
//!
//! The connection manager owns the transport: it performs the handshake,
//! drives the link's single event-processing loop, emits keep-alive
//! probes, and schedules reconnect attempts after an unexpected loss.
//! Every state transition is published to the event bus as a boolean
//! connectivity change.
//!
//! Reconnection policy: when a previously connected link is lost, or a
//! handshake fails, a new attempt is scheduled after a fixed delay
//! ([`ReconnectConfig::delay_ms`], default 5000 ms). The retry count is
//! unbounded by default, which is deliberate: an unattended client keeps
//! trying to come back until told to leave.
//! [`ReconnectConfig::max_attempts`] optionally caps consecutive failed
//! handshakes.

use std::fmt;
use std::sync::Arc;

use banter_protocol::ChatEvent;
use banter_transport::{Connection, Connector, Incoming, TransportError};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant};
use tracing::{debug, error, info, warn};

use crate::bus::EventBus;
use crate::config::{HeartbeatConfig, ReconnectConfig};
use crate::error::ClientError;

/// Connectivity of the session transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport; the initial state and the result of any teardown.
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Link established and healthy.
    Connected,
    /// Last handshake failed; a retry is scheduled.
    Failed,
}

impl ConnectionState {
    /// Check whether the link is up.
    #[must_use]
    pub fn is_connected(self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// Why the link loop ended.
enum LinkExit {
    /// `disconnect()` asked for teardown.
    Shutdown,
    /// The link died underneath us.
    Lost(TransportError),
}

struct ManagerInner {
    connector: Arc<dyn Connector>,
    heartbeat: HeartbeatConfig,
    reconnect: ReconnectConfig,
    bus: EventBus,
    state: Mutex<ConnectionState>,
    /// Sender for outbound frames; present only while a link is active.
    outbound: Mutex<Option<mpsc::UnboundedSender<ChatEvent>>>,
    /// Shutdown signal for the running supervisor, if any.
    shutdown: Mutex<Option<watch::Sender<bool>>>,
    /// Running supervisor task, if any.
    supervisor: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl ManagerInner {
    /// Move to `next` and publish the new connectivity.
    ///
    /// Runs the bus dispatch outside the state lock so handlers may read
    /// the state back.
    fn transition(&self, next: ConnectionState) {
        let prev = {
            let mut state = self.state.lock();
            std::mem::replace(&mut *state, next)
        };

        if prev != next {
            debug!(from = %prev, to = %next, "Connection state changed");
            self.bus.publish_status(next.is_connected());
        }
    }
}

/// Manages the transport lifecycle for one session.
///
/// Exactly one link is active at a time. All inbound traffic is processed
/// on one event-processing path (the link loop); the bus dispatches from
/// that path.
pub struct ConnectionManager {
    inner: Arc<ManagerInner>,
}

impl ConnectionManager {
    /// Create a manager in the `Disconnected` state.
    #[must_use]
    pub fn new(
        connector: Arc<dyn Connector>,
        heartbeat: HeartbeatConfig,
        reconnect: ReconnectConfig,
        bus: EventBus,
    ) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                connector,
                heartbeat,
                reconnect,
                bus,
                state: Mutex::new(ConnectionState::Disconnected),
                outbound: Mutex::new(None),
                shutdown: Mutex::new(None),
                supervisor: tokio::sync::Mutex::new(None),
            }),
        }
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.inner.state.lock()
    }

    /// Check whether the link is up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Initiate the transport handshake against `endpoint`.
    ///
    /// Resolves once the link is established. If the first attempt fails
    /// the error is returned, but a retry stays scheduled; `Failed` is
    /// never terminal. Calling while a link is already active is a logged
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns a transport or protocol error if the first handshake
    /// attempt fails.
    pub async fn connect(&self, endpoint: &str) -> Result<(), ClientError> {
        let (ready_tx, ready_rx) = oneshot::channel();

        {
            let mut supervisor = self.inner.supervisor.lock().await;

            match supervisor.as_ref().map(JoinHandle::is_finished) {
                Some(false) => {
                    debug!("Connect requested while a link is already active");
                    return Ok(());
                }
                Some(true) => {
                    supervisor.take();
                }
                None => {}
            }

            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            *self.inner.shutdown.lock() = Some(shutdown_tx);

            let inner = Arc::clone(&self.inner);
            let endpoint = endpoint.to_string();
            *supervisor = Some(tokio::spawn(supervise(
                inner,
                endpoint,
                ready_tx,
                shutdown_rx,
            )));
        }

        ready_rx
            .await
            .unwrap_or_else(|_| Err(ClientError::Transport(TransportError::ConnectionClosed)))
    }

    /// Tear down the active link.
    ///
    /// Cancels any pending reconnect timer, stops the link loop (flushing
    /// frames already queued), and transitions to `Disconnected` before
    /// returning. Idempotent: while already disconnected this is a no-op
    /// that emits no events.
    pub async fn disconnect(&self) {
        let handle = self.inner.supervisor.lock().await.take();
        let Some(handle) = handle else {
            return;
        };

        if let Some(shutdown) = self.inner.shutdown.lock().take() {
            let _ = shutdown.send(true);
        }

        if let Err(e) = handle.await {
            warn!(error = %e, "Supervisor ended with a join error");
        }
    }

    /// Queue one outbound frame.
    ///
    /// Fire-and-forget, at-most-once: the frame is handed to the link
    /// loop and never retried.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConnected`] when no link is up.
    pub fn send_event(&self, event: ChatEvent) -> Result<(), ClientError> {
        if !self.is_connected() {
            return Err(ClientError::NotConnected);
        }

        let outbound = self.inner.outbound.lock();
        match outbound.as_ref() {
            Some(tx) if tx.send(event).is_ok() => Ok(()),
            _ => Err(ClientError::NotConnected),
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        // `Drop` is synchronous, so a graceful close cannot be awaited
        // here; aborting the supervisor drops the link future immediately.
        if let Ok(mut supervisor) = self.inner.supervisor.try_lock() {
            if let Some(handle) = supervisor.take() {
                handle.abort();
            }
        }
    }
}

/// Connect/retry loop: owns the link for its whole lifetime.
async fn supervise(
    inner: Arc<ManagerInner>,
    endpoint: String,
    ready: oneshot::Sender<Result<(), ClientError>>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ready = Some(ready);
    let mut failures: u32 = 0;

    loop {
        inner.transition(ConnectionState::Connecting);

        let attempt = tokio::select! {
            result = inner.connector.connect(&endpoint) => result,
            _ = shutdown.changed() => {
                inner.transition(ConnectionState::Disconnected);
                return;
            }
        };

        match attempt {
            Ok(conn) => {
                failures = 0;

                let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
                *inner.outbound.lock() = Some(outbound_tx);
                inner.transition(ConnectionState::Connected);
                if let Some(tx) = ready.take() {
                    let _ = tx.send(Ok(()));
                }
                info!(endpoint = %endpoint, transport = inner.connector.name(), "Connected");

                let exit = drive_link(&inner, conn, outbound_rx, &mut shutdown).await;
                inner.outbound.lock().take();

                match exit {
                    LinkExit::Shutdown => {
                        inner.transition(ConnectionState::Disconnected);
                        debug!("Link shut down");
                        return;
                    }
                    LinkExit::Lost(reason) => {
                        warn!(error = %reason, "Link lost unexpectedly");
                        inner.transition(ConnectionState::Disconnected);
                    }
                }
            }
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "Handshake failed");
                inner.transition(ConnectionState::Failed);
                if let Some(tx) = ready.take() {
                    let _ = tx.send(Err(e.into()));
                }

                failures += 1;
                if let Some(max) = inner.reconnect.max_attempts {
                    if failures >= max {
                        error!(attempts = failures, "Retry ceiling reached, giving up");
                        inner.transition(ConnectionState::Disconnected);
                        return;
                    }
                }
            }
        }

        let delay = inner.reconnect.delay();
        debug!(delay_ms = inner.reconnect.delay_ms, "Scheduling reconnect");
        tokio::select! {
            () = sleep(delay) => {}
            _ = shutdown.changed() => {
                inner.transition(ConnectionState::Disconnected);
                return;
            }
        }
    }
}

/// The single event-processing path for one connection instance.
///
/// Multiplexes outbound frames, inbound frames, keep-alive ticks and the
/// shutdown signal. Inbound events reach subscribers from here in exactly
/// transport arrival order.
async fn drive_link(
    inner: &ManagerInner,
    mut conn: Box<dyn Connection>,
    mut outbound: mpsc::UnboundedReceiver<ChatEvent>,
    shutdown: &mut watch::Receiver<bool>,
) -> LinkExit {
    let period = inner.heartbeat.interval();
    let mut heartbeat = interval_at(Instant::now() + period, period);
    let mut last_inbound = Instant::now();

    loop {
        tokio::select! {
            biased;

            _ = shutdown.changed() => {
                // Flush frames already queued (the Leave announcement)
                // before closing.
                while let Ok(event) = outbound.try_recv() {
                    if conn.send(&event).await.is_err() {
                        break;
                    }
                }
                if let Err(e) = conn.close().await {
                    debug!(error = %e, "Graceful close failed");
                }
                return LinkExit::Shutdown;
            }

            outgoing = outbound.recv() => {
                match outgoing {
                    Some(event) => {
                        if let Err(e) = conn.send(&event).await {
                            error!(error = %e, "Send failed");
                            return LinkExit::Lost(e);
                        }
                    }
                    // All senders gone; the manager is being torn down.
                    None => {
                        let _ = conn.close().await;
                        return LinkExit::Shutdown;
                    }
                }
            }

            incoming = conn.recv() => {
                match incoming {
                    Ok(Some(Incoming::Event(event))) => {
                        last_inbound = Instant::now();
                        inner.bus.publish_message(&event);
                    }
                    Ok(Some(Incoming::Keepalive)) => {
                        last_inbound = Instant::now();
                    }
                    Ok(None) => {
                        debug!("Server closed the connection");
                        return LinkExit::Lost(TransportError::ConnectionClosed);
                    }
                    Err(e) => {
                        error!(error = %e, "Receive failed");
                        return LinkExit::Lost(e);
                    }
                }
            }

            _ = heartbeat.tick() => {
                if last_inbound.elapsed() > inner.heartbeat.timeout() {
                    warn!(
                        silent_ms = last_inbound.elapsed().as_millis() as u64,
                        "No inbound traffic within the heartbeat window"
                    );
                    return LinkExit::Lost(TransportError::HeartbeatTimeout);
                }
                if let Err(e) = conn.ping().await {
                    error!(error = %e, "Keep-alive probe failed");
                    return LinkExit::Lost(e);
                }
            }
        }
    }
}
