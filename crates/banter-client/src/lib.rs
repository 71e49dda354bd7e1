//! # banter-client
//!
//! Session core for the Banter group-chat client.
//!
//! This crate provides the fundamental building blocks:
//!
//! - **Session** - join/leave/send plus the exposed read state
//! - **ConnectionManager** - transport lifecycle, heartbeat, reconnect
//! - **EventBus** - typed fan-out of inbound events and connectivity
//! - **Roster** - presence derived from observed Join/Leave events
//!
//! Presentation concerns stay out of this crate; the [`avatar`] helpers
//! are pure functions offered to whichever layer renders users.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────┐     ┌─────────────┐     ┌────────────────────┐
//! │   UI   │────▶│   Session   │────▶│ ConnectionManager  │──▶ server
//! └────────┘     └─────────────┘     └─────────┬──────────┘
//!      ▲                ▲                      │ inbound
//!      │                │                      ▼
//!      │          ┌─────┴──────┐        ┌────────────┐
//!      └──────────│   Roster   │◀───────│  EventBus  │
//!                 └────────────┘        └────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use banter_client::{ClientConfig, Session};
//!
//! let session = Session::with_config(ClientConfig::default());
//! session.join("alice").await?;
//! session.send_message("hello everyone", "alice")?;
//! session.leave("alice").await;
//! ```

pub mod avatar;
pub mod bus;
pub mod config;
pub mod connection;
pub mod error;
pub mod presence;
pub mod session;
pub mod validate;

pub use banter_protocol::{ChatEvent, EventKind};
pub use bus::{EventBus, Subscription};
pub use config::{ClientConfig, ConfigError, HeartbeatConfig, ReconnectConfig};
pub use connection::{ConnectionManager, ConnectionState};
pub use error::ClientError;
pub use presence::Roster;
pub use session::Session;
pub use validate::{validate_message, validate_username, ValidationError};
