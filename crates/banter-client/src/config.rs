//! Client configuration.
//!
//! Configuration can be loaded from:
//! - Environment variables (BANTER_*)
//! - TOML configuration file

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Chat server endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Heartbeat configuration.
    #[serde(default)]
    pub heartbeat: HeartbeatConfig,

    /// Reconnect configuration.
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

/// Heartbeat configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatConfig {
    /// Keep-alive probe interval in milliseconds, outgoing and expected
    /// incoming.
    #[serde(default = "default_heartbeat_interval")]
    pub interval_ms: u64,

    /// The link is treated as dead after this much inbound silence,
    /// in milliseconds.
    #[serde(default = "default_heartbeat_timeout")]
    pub timeout_ms: u64,
}

/// Reconnect configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Fixed delay between reconnect attempts in milliseconds.
    #[serde(default = "default_reconnect_delay")]
    pub delay_ms: u64,

    /// Optional cap on consecutive failed attempts.
    ///
    /// `None` retries forever. Unbounded retry is the deliberate default:
    /// an unattended chat client keeps trying to come back until told to
    /// leave.
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

// Default value functions
fn default_endpoint() -> String {
    std::env::var("BANTER_ENDPOINT").unwrap_or_else(|_| "ws://127.0.0.1:8080/ws".to_string())
}

fn default_heartbeat_interval() -> u64 {
    4_000
}

fn default_heartbeat_timeout() -> u64 {
    8_000
}

fn default_reconnect_delay() -> u64 {
    5_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            heartbeat: HeartbeatConfig::default(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_heartbeat_interval(),
            timeout_ms: default_heartbeat_timeout(),
        }
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_reconnect_delay(),
            max_attempts: None,
        }
    }
}

impl HeartbeatConfig {
    /// Probe interval as a [`Duration`].
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Policy window as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ReconnectConfig {
    /// Delay between attempts as a [`Duration`].
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl ClientConfig {
    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: ClientConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}
