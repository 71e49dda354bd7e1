//! Well-known server routes for the Banter chat protocol.
//!
//! The server exposes one socket endpoint. Outbound frames are addressed
//! to a per-operation channel, and everything inbound arrives on a single
//! broadcast topic shared by all connected clients. Over the raw socket
//! each frame is the bare event JSON; the `type` field selects the
//! operation, and these constants document the server-side contract.

use crate::event::EventKind;

/// Socket endpoint path on the chat server host.
pub const ENDPOINT_PATH: &str = "/ws";

/// Outbound channel for regular chat messages.
pub const SEND_MESSAGE: &str = "/app/chat.sendMessage";

/// Outbound channel announcing a user joining.
pub const ADD_USER: &str = "/app/chat.addUser";

/// Outbound channel announcing a user leaving.
pub const REMOVE_USER: &str = "/app/chat.removeUser";

/// Inbound broadcast topic delivering all frames to every client.
pub const BROADCAST_TOPIC: &str = "/topic/public";

/// Map an outbound event kind to its destination channel.
#[must_use]
pub fn destination_for(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Chat => SEND_MESSAGE,
        EventKind::Join => ADD_USER,
        EventKind::Leave => REMOVE_USER,
    }
}
