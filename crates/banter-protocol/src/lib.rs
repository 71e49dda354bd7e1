//! # banter-protocol
//!
//! Wire protocol definitions for the Banter group-chat client.
//!
//! This crate defines the JSON event frames exchanged between chat clients
//! and the chat server, the codec that reads and writes them, and the
//! well-known server routes.
//!
//! ## Event Kinds
//!
//! - `Chat` - a regular message between users
//! - `Join` - a user entered the chat
//! - `Leave` - a user left the chat
//!
//! ## Example
//!
//! ```rust
//! use banter_protocol::{codec, ChatEvent};
//!
//! let event = ChatEvent::chat("alice", "Hello, world!");
//!
//! // Encode and decode
//! let encoded = codec::encode(&event).unwrap();
//! let decoded = codec::decode(&encoded).unwrap();
//! assert_eq!(event, decoded);
//! ```

pub mod codec;
pub mod event;
pub mod routes;

pub use codec::{decode, encode, ProtocolError};
pub use event::{epoch_millis, ChatEvent, EventKind};
