//! Codec for encoding and decoding Banter frames.
//!
//! One frame per event: a single JSON object carried in a text frame.

use thiserror::Error;

use crate::event::ChatEvent;

/// Maximum frame size (16 KiB).
///
/// Generous for chat events (content is capped well below this) while
/// rejecting runaway frames from a misbehaving peer.
pub const MAX_FRAME_SIZE: usize = 16 * 1024;

/// Protocol errors that can occur during encoding/decoding.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame exceeds maximum size.
    #[error("Frame size {0} exceeds maximum {MAX_FRAME_SIZE}")]
    FrameTooLarge(usize),

    /// JSON encoding error.
    #[error("Encoding error: {0}")]
    Encode(#[source] serde_json::Error),

    /// JSON decoding error.
    #[error("Decoding error: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Encode an event to its wire form.
///
/// # Errors
///
/// Returns an error if the event is too large or serialization fails.
pub fn encode(event: &ChatEvent) -> Result<String, ProtocolError> {
    let payload = serde_json::to_string(event).map_err(ProtocolError::Encode)?;

    if payload.len() > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge(payload.len()));
    }

    Ok(payload)
}

/// Decode an event from its wire form.
///
/// # Errors
///
/// Returns an error if the frame is too large or is not a valid event.
pub fn decode(data: &str) -> Result<ChatEvent, ProtocolError> {
    if data.len() > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge(data.len()));
    }

    serde_json::from_str(data).map_err(ProtocolError::Decode)
}
