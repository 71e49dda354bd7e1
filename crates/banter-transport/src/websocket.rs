//! WebSocket transport implementation.
//!
//! This module provides the preferred transport using tokio-tungstenite.

use async_trait::async_trait;
use banter_protocol::{codec, ChatEvent, ProtocolError};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message},
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, warn};

use crate::traits::{Connection, Connector, Incoming, TransportError};

/// WebSocket transport configuration.
#[derive(Debug, Clone)]
pub struct WebSocketConfig {
    /// Maximum inbound frame size in bytes.
    pub max_frame_size: usize,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            max_frame_size: codec::MAX_FRAME_SIZE,
        }
    }
}

/// WebSocket connector.
#[derive(Debug, Default)]
pub struct WebSocketConnector {
    config: WebSocketConfig,
}

impl WebSocketConnector {
    /// Create a new WebSocket connector.
    #[must_use]
    pub fn new(config: WebSocketConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Connection>, TransportError> {
        let (stream, response) = connect_async(url).await.map_err(|e| match e {
            WsError::Http(resp) => {
                TransportError::Handshake(format!("server rejected upgrade: {}", resp.status()))
            }
            WsError::Io(io) => TransportError::Io(io),
            other => TransportError::Handshake(other.to_string()),
        })?;

        debug!(url = %url, status = %response.status(), "WebSocket handshake completed");

        let conn = WebSocketConnection::new(stream, self.config.max_frame_size);
        Ok(Box::new(conn))
    }

    fn name(&self) -> &'static str {
        "websocket"
    }
}

/// A WebSocket connection.
pub struct WebSocketConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    is_open: bool,
    max_frame_size: usize,
}

impl WebSocketConnection {
    fn new(stream: WebSocketStream<MaybeTlsStream<TcpStream>>, max_frame_size: usize) -> Self {
        Self {
            stream,
            is_open: true,
            max_frame_size,
        }
    }

    /// Decode one text payload, skipping frames that do not parse.
    ///
    /// A malformed broadcast frame from a misbehaving peer is dropped with
    /// a warning rather than tearing down the link; an oversized frame is
    /// a protocol error.
    fn decode_frame(&self, text: &str) -> Result<Option<ChatEvent>, TransportError> {
        if text.len() > self.max_frame_size {
            return Err(TransportError::Protocol(ProtocolError::FrameTooLarge(
                text.len(),
            )));
        }

        match codec::decode(text) {
            Ok(event) => Ok(Some(event)),
            Err(e) => {
                warn!(error = %e, "Dropping undecodable frame");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl Connection for WebSocketConnection {
    async fn recv(&mut self) -> Result<Option<Incoming>, TransportError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    if let Some(event) = self.decode_frame(&text)? {
                        return Ok(Some(Incoming::Event(event)));
                    }
                    // Undecodable frame dropped, keep reading
                }
                Some(Ok(Message::Binary(data))) => {
                    // For compatibility, tolerate UTF-8 payloads in binary frames
                    match std::str::from_utf8(&data) {
                        Ok(text) => {
                            if let Some(event) = self.decode_frame(text)? {
                                return Ok(Some(Incoming::Event(event)));
                            }
                        }
                        Err(_) => {
                            warn!(len = data.len(), "Dropping non-UTF-8 binary frame");
                        }
                    }
                }
                Some(Ok(Message::Ping(data))) => {
                    if let Err(e) = self.stream.send(Message::Pong(data)).await {
                        warn!(error = %e, "Failed to send pong");
                    }
                    return Ok(Some(Incoming::Keepalive));
                }
                Some(Ok(Message::Pong(_))) => {
                    return Ok(Some(Incoming::Keepalive));
                }
                Some(Ok(Message::Close(_))) => {
                    debug!("Received close frame");
                    self.is_open = false;
                    return Ok(None);
                }
                Some(Ok(Message::Frame(_))) => {
                    // Raw frame, ignore
                }
                Some(Err(WsError::ConnectionClosed)) => {
                    debug!("Connection closed");
                    self.is_open = false;
                    return Ok(None);
                }
                Some(Err(e)) => {
                    self.is_open = false;
                    return Err(TransportError::ReceiveFailed(e.to_string()));
                }
                None => {
                    debug!("WebSocket stream ended");
                    self.is_open = false;
                    return Ok(None);
                }
            }
        }
    }

    async fn send(&mut self, event: &ChatEvent) -> Result<(), TransportError> {
        if !self.is_open {
            return Err(TransportError::ConnectionClosed);
        }

        let payload = codec::encode(event)?;
        self.stream
            .send(Message::Text(payload))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn ping(&mut self) -> Result<(), TransportError> {
        if !self.is_open {
            return Err(TransportError::ConnectionClosed);
        }

        self.stream
            .send(Message::Ping(Vec::new()))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if !self.is_open {
            return Ok(()); // Already closed
        }
        self.is_open = false;

        self.stream
            .close(None)
            .await
            .map_err(|e| TransportError::Other(format!("Failed to close: {e}")))
    }

    fn is_open(&self) -> bool {
        self.is_open
    }
}
