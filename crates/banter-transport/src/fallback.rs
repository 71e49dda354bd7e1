//! Fallback transport negotiation.
//!
//! This module provides automatic transport selection and fallback when
//! the preferred transport cannot reach the server.

use crate::traits::{Connection, Connector, TransportError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// A connector that tries multiple transports in order of preference.
pub struct FallbackConnector {
    connectors: Vec<Arc<dyn Connector>>,
}

impl FallbackConnector {
    /// Create a new fallback connector with the given transports.
    ///
    /// Connectors are tried in order (first = highest priority).
    #[must_use]
    pub fn new(connectors: Vec<Arc<dyn Connector>>) -> Self {
        Self { connectors }
    }

    /// Add a connector to the fallback chain.
    pub fn add_connector(&mut self, connector: Arc<dyn Connector>) {
        self.connectors.push(connector);
    }

    /// Get the list of transport names in priority order.
    #[must_use]
    pub fn connector_names(&self) -> Vec<&'static str> {
        self.connectors.iter().map(|c| c.name()).collect()
    }
}

#[cfg(feature = "websocket")]
impl Default for FallbackConnector {
    /// The standard chain: WebSocket only, with room for a long-polling
    /// connector behind it.
    fn default() -> Self {
        Self::new(vec![Arc::new(crate::websocket::WebSocketConnector::default())])
    }
}

#[async_trait]
impl Connector for FallbackConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Connection>, TransportError> {
        let mut last_error = None;

        for connector in &self.connectors {
            if !connector.is_available() {
                continue;
            }

            match connector.connect(url).await {
                Ok(conn) => return Ok(conn),
                Err(e) => {
                    warn!(
                        transport = connector.name(),
                        error = %e,
                        "Connect failed, trying next transport"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| TransportError::Other("No transports available".into())))
    }

    fn name(&self) -> &'static str {
        "fallback"
    }

    fn is_available(&self) -> bool {
        self.connectors.iter().any(|c| c.is_available())
    }
}

/// Negotiate the best transport for a client.
///
/// Examines the client's capabilities against what the server offers and
/// selects the most appropriate transport.
#[must_use]
pub fn negotiate_transport(
    client_capabilities: &[&str],
    available_transports: &[&str],
) -> Option<&'static str> {
    // Priority order: raw socket preferred, long-polling fallback
    let priority = ["websocket", "longpoll"];

    for transport in priority {
        if client_capabilities.contains(&transport) && available_transports.contains(&transport) {
            return match transport {
                "websocket" => Some("websocket"),
                "longpoll" => Some("longpoll"),
                _ => None,
            };
        }
    }

    None
}
