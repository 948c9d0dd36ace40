//! Gateway entry point: endpoint plus access token.
//!
//! One [`SpeechClient`] can be kept for the life of the application; each
//! flavor client opens its own connection through it. Tokens expire;
//! refresh with [`set_token`](SpeechClient::set_token) before building new
//! tasks (acquiring the token itself is outside this crate).

use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;
use url::Url;

use crate::error::{Result, SpeechError};
use crate::transport::{TransportEvent, WsConnection};

/// Public gateway endpoint used when none is configured.
pub const DEFAULT_GATEWAY_URL: &str = "wss://nls-gateway.cn-shanghai.aliyuncs.com/ws/v1";

/// Bound on connection establishment.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Factory for gateway connections.
#[derive(Debug, Clone)]
pub struct SpeechClient {
    endpoint: String,
    token: String,
}

impl SpeechClient {
    /// Client against the default gateway endpoint.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_GATEWAY_URL.to_string(),
            token: token.into(),
        }
    }

    /// Client against a specific environment's endpoint.
    pub fn with_endpoint(endpoint: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into();
        let parsed = Url::parse(&endpoint)
            .map_err(|e| SpeechError::Configuration(format!("invalid endpoint url: {e}")))?;
        if !matches!(parsed.scheme(), "ws" | "wss") {
            return Err(SpeechError::Configuration(format!(
                "endpoint scheme must be ws or wss, got {}",
                parsed.scheme()
            )));
        }
        Ok(Self {
            endpoint,
            token: token.into(),
        })
    }

    /// Replace the access token; affects connections opened afterwards.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = token.into();
    }

    /// The configured endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Open one connection for one task.
    pub(crate) async fn open(&self) -> Result<(WsConnection, mpsc::Receiver<TransportEvent>)> {
        debug!("opening gateway connection to {}", self.endpoint);
        let pair =
            WsConnection::connect(&self.endpoint, &self.token, DEFAULT_CONNECT_TIMEOUT).await?;
        Ok(pair)
    }
}
