//! Transport abstraction for the gateway connection.
//!
//! The session core only depends on the [`Connection`] trait and the
//! [`TransportEvent`] stream, so tests can drive a task with an in-memory
//! fake. The production implementation is [`websocket::WsConnection`].

mod websocket;

pub use websocket::WsConnection;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Transport-level failures.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("failed to connect: {0}")]
    ConnectFailed(String),

    /// The handshake did not finish within the configured bound.
    #[error("connection timed out after {0} ms")]
    ConnectTimeout(u64),

    /// A frame could not be written to the socket.
    #[error("failed to send: {0}")]
    SendFailed(String),

    /// The socket failed while the connection was in use.
    #[error("network error: {0}")]
    Network(String),

    /// The connection is already closed.
    #[error("connection is closed")]
    NotConnected,
}

/// Inbound events delivered by the connection's reader task.
///
/// Events for a single connection are delivered in the order the transport
/// produced them and must be consumed sequentially.
#[derive(Debug)]
pub enum TransportEvent {
    /// A text frame (JSON protocol event).
    Text(String),
    /// A binary frame (audio data pushed by the server).
    Binary(Bytes),
    /// The connection closed, either locally or by the peer.
    Closed {
        /// RFC 6455 close code (1006 if the stream ended without a close frame)
        code: u16,
        /// Close reason supplied by the peer (may be empty)
        reason: String,
    },
    /// The transport failed; no further events will follow.
    Error(String),
}

/// Outbound capability of one gateway connection.
///
/// A connection is owned by exactly one task for its lifetime; it may be
/// reused across sequential operations of that task (and, for dialog,
/// across multiple query turns) but never shared between tasks.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Send a UTF-8 text frame (serialized protocol envelope).
    async fn send_text(&self, text: String) -> Result<(), TransportError>;

    /// Send a binary frame (audio chunk).
    async fn send_binary(&self, data: Bytes) -> Result<(), TransportError>;

    /// Close the connection. Idempotent.
    async fn close(&self);
}
