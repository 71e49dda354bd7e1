//! # banter-transport
//!
//! Transport layer for the Banter chat client.
//!
//! This crate provides a unified interface for reaching the chat server
//! over different transports:
//!
//! - **WebSocket** - the preferred transport, works everywhere
//! - **Fallback** - tries transports in preference order so clients keep
//!   working where the preferred transport is blocked
//!
//! ## Transport Abstraction
//!
//! All transports implement the [`Connector`] and [`Connection`] traits,
//! keeping the session core protocol-agnostic.
//!
//! ```rust,ignore
//! use banter_transport::{Connection, Connector, Incoming};
//!
//! async fn drain(mut conn: Box<dyn Connection>) {
//!     while let Ok(Some(incoming)) = conn.recv().await {
//!         if let Incoming::Event(event) = incoming {
//!             // Process event
//!         }
//!     }
//! }
//! ```

pub mod fallback;
pub mod traits;

#[cfg(feature = "websocket")]
pub mod websocket;

pub use fallback::FallbackConnector;
pub use traits::{Connection, Connector, Incoming, TransportError};

#[cfg(feature = "websocket")]
pub use websocket::WebSocketConnector;
