//! WebSocket transport over `tokio-tungstenite`.
//!
//! One [`WsConnection`] wraps one socket. Outbound frames are written
//! directly (so per-chunk I/O failures surface to the caller synchronously);
//! inbound frames are forwarded by a spawned reader task as
//! [`TransportEvent`]s over a bounded channel, preserving wire order.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use super::{Connection, TransportError, TransportEvent};

/// Handshake header carrying the caller-supplied access token.
pub(crate) const TOKEN_HEADER: &str = "X-NLS-Token";

/// Bounded inbound event queue; large enough for bursts of intermediate
/// results while the caller is busy, small enough to apply backpressure.
const EVENT_QUEUE_SIZE: usize = 256;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// A live WebSocket connection to the speech gateway.
pub struct WsConnection {
    sink: Mutex<Option<WsSink>>,
}

impl WsConnection {
    /// Open a connection to `endpoint`, presenting `token` in the handshake.
    ///
    /// Returns the connection plus the receiver for its inbound events. The
    /// receiver must be drained by exactly one consumer; dropping it ends
    /// the reader task.
    pub async fn connect(
        endpoint: &str,
        token: &str,
        connect_timeout: Duration,
    ) -> Result<(Self, mpsc::Receiver<TransportEvent>), TransportError> {
        let mut request = endpoint
            .into_client_request()
            .map_err(|e| TransportError::ConnectFailed(format!("invalid endpoint: {e}")))?;
        let token_value = token
            .parse()
            .map_err(|_| TransportError::ConnectFailed("token is not a valid header value".into()))?;
        request.headers_mut().insert(TOKEN_HEADER, token_value);

        let (ws_stream, _response) = timeout(connect_timeout, connect_async(request))
            .await
            .map_err(|_| TransportError::ConnectTimeout(connect_timeout.as_millis() as u64))?
            .map_err(|e| TransportError::ConnectFailed(e.to_string()))?;

        info!("connected to speech gateway at {}", endpoint);

        let (sink, stream) = ws_stream.split();
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_SIZE);
        tokio::spawn(read_loop(stream, event_tx));

        Ok((
            Self {
                sink: Mutex::new(Some(sink)),
            },
            event_rx,
        ))
    }
}

#[async_trait]
impl Connection for WsConnection {
    async fn send_text(&self, text: String) -> Result<(), TransportError> {
        let mut guard = self.sink.lock().await;
        let sink = guard.as_mut().ok_or(TransportError::NotConnected)?;
        sink.send(Message::Text(text.into()))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn send_binary(&self, data: Bytes) -> Result<(), TransportError> {
        let mut guard = self.sink.lock().await;
        let sink = guard.as_mut().ok_or(TransportError::NotConnected)?;
        sink.send(Message::Binary(data))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn close(&self) {
        let mut guard = self.sink.lock().await;
        if let Some(mut sink) = guard.take() {
            let _ = sink.send(Message::Close(None)).await;
            let _ = sink.flush().await;
            debug!("close frame sent");
        }
    }
}

/// Forward inbound frames to the event channel until the stream ends.
async fn read_loop(mut stream: WsStream, events: mpsc::Sender<TransportEvent>) {
    let mut closed = false;
    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => {
                if events
                    .send(TransportEvent::Text(text.to_string()))
                    .await
                    .is_err()
                {
                    return;
                }
            }
            Ok(Message::Binary(data)) => {
                if events.send(TransportEvent::Binary(data)).await.is_err() {
                    return;
                }
            }
            Ok(Message::Close(frame)) => {
                let (code, reason) = frame
                    .map(|f| (u16::from(f.code), f.reason.to_string()))
                    .unwrap_or((1005, String::new()));
                info!("connection closed by peer, code: {}, reason: {}", code, reason);
                let _ = events.send(TransportEvent::Closed { code, reason }).await;
                closed = true;
                break;
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                debug!("keepalive frame");
            }
            Ok(_) => {}
            Err(e) => {
                warn!("websocket read error: {}", e);
                let _ = events.send(TransportEvent::Error(e.to_string())).await;
                closed = true;
                break;
            }
        }
    }
    if !closed {
        // Stream ended without a close frame; report an abnormal closure so
        // no waiter is left hanging.
        let _ = events
            .send(TransportEvent::Closed {
                code: 1006,
                reason: "connection reset".to_string(),
            })
            .await;
    }
}
