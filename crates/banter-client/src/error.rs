//! Error types for the Banter client.

use banter_protocol::ProtocolError;
use banter_transport::TransportError;
use thiserror::Error;

use crate::validate::ValidationError;

/// Every failure a session can surface to its caller.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or socket failure.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The peer violated the wire protocol.
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Malformed username or message content, caught before any network
    /// action.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A state-changing call was attempted while not connected.
    #[error("Not connected to the chat server")]
    NotConnected,
}
