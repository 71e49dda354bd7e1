//! Transport abstraction traits for the Banter client.
//!
//! These traits define the interface that all transport implementations
//! must provide, keeping the session core transport-agnostic.

use async_trait::async_trait;
use banter_protocol::ChatEvent;
use thiserror::Error;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection was closed.
    #[error("Connection closed")]
    ConnectionClosed,

    /// The server rejected or aborted the handshake.
    #[error("Handshake failed: {0}")]
    Handshake(String),

    /// No inbound traffic within the heartbeat policy window.
    #[error("Heartbeat timed out")]
    HeartbeatTimeout,

    /// Failed to send data.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// Failed to receive data.
    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    /// Protocol error.
    #[error("Protocol error: {0}")]
    Protocol(#[from] banter_protocol::ProtocolError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

/// Something received from the server.
///
/// Transport-level keep-alive traffic is surfaced so the connection
/// manager's heartbeat watchdog can observe link liveness without the
/// transport leaking its framing details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// A decoded chat event from the broadcast topic.
    Event(ChatEvent),
    /// A transport-level keep-alive (ping already answered, or pong).
    Keepalive,
}

/// A transport that can open connections to the chat server.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a connection to the given endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the handshake fails or the endpoint is
    /// unreachable.
    async fn connect(&self, url: &str) -> Result<Box<dyn Connection>, TransportError>;

    /// Get the transport name (e.g., "websocket", "longpoll").
    fn name(&self) -> &'static str;

    /// Check if the transport can be attempted in this environment.
    fn is_available(&self) -> bool {
        true
    }
}

/// An active connection to the chat server.
///
/// Connections carry the bidirectional flow of event frames between one
/// client and the server.
#[async_trait]
pub trait Connection: Send {
    /// Receive the next inbound item.
    ///
    /// Returns `None` if the connection is closed cleanly.
    async fn recv(&mut self) -> Result<Option<Incoming>, TransportError>;

    /// Send an event to the server.
    async fn send(&mut self, event: &ChatEvent) -> Result<(), TransportError>;

    /// Send a transport-level keep-alive probe.
    async fn ping(&mut self) -> Result<(), TransportError>;

    /// Close the connection gracefully.
    async fn close(&mut self) -> Result<(), TransportError>;

    /// Check if the connection is still open.
    fn is_open(&self) -> bool;
}
