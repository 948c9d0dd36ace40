//! One-shot recognition client.

use bytes::Bytes;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncRead;

use super::config::RecognizerConfig;
use crate::client::SpeechClient;
use crate::core::audio::AudioFeeder;
use crate::core::listener::EventListener;
use crate::core::protocol::envelope::Envelope;
use crate::core::protocol::flavor::RECOGNIZER;
use crate::core::protocol::session::SessionCore;
use crate::core::protocol::state::TaskState;
use crate::error::{Result, SpeechError};

/// Client for one short-utterance recognition task.
///
/// Owns one connection for the task's lifetime. Not intended for concurrent
/// use by multiple callers; serialize your own calls into one instance.
///
/// # Example
///
/// ```rust,no_run
/// use speechlink::{EventListener, SpeechClient, SpeechRecognizer, RecognizerConfig};
/// use std::sync::Arc;
///
/// struct Printer;
///
/// #[async_trait::async_trait]
/// impl EventListener for Printer {
///     async fn on_completed(&self, response: speechlink::Envelope) {
///         println!("result: {:?}", response.payload_str("result"));
///     }
/// }
///
/// # async fn run(audio: Vec<u8>) -> speechlink::Result<()> {
/// let client = SpeechClient::new("your-access-token");
/// let mut recognizer = SpeechRecognizer::new(
///     &client,
///     RecognizerConfig::new("your-app-key"),
///     Arc::new(Printer),
/// )
/// .await?;
/// recognizer.start().await?;
/// recognizer.send(audio).await?;
/// recognizer.stop().await?;
/// recognizer.close().await;
/// # Ok(())
/// # }
/// ```
pub struct SpeechRecognizer {
    session: Arc<SessionCore>,
    request: Envelope,
}

impl SpeechRecognizer {
    /// Open a connection and bind a new recognition task to it.
    pub async fn new(
        client: &SpeechClient,
        config: RecognizerConfig,
        listener: Arc<dyn EventListener>,
    ) -> Result<Self> {
        if config.app_key.is_empty() {
            return Err(SpeechError::Configuration("app_key is required".to_string()));
        }

        let (conn, events) = client.open().await?;
        let session = Arc::new(SessionCore::new(
            RECOGNIZER,
            Arc::new(conn),
            Some(config.app_key.clone()),
        ));
        session.mark_connected();
        tokio::spawn(SessionCore::pump(session.clone(), events, listener));

        let mut request = Envelope::request(RECOGNIZER.namespace, RECOGNIZER.start_request);
        request.header.appkey = Some(config.app_key.clone());
        request.payload = Some(config.payload());

        Ok(Self { session, request })
    }

    /// Send the recognition request and wait for the server's confirmation
    /// (bounded at 10 seconds).
    pub async fn start(&mut self) -> Result<()> {
        self.session.start(&mut self.request).await
    }

    /// Stream one audio chunk. The caller controls the send rate.
    pub async fn send(&self, data: impl Into<Bytes>) -> Result<()> {
        self.session.send_audio(data.into()).await
    }

    /// Stream a continuous capture source to exhaustion in default-sized
    /// chunks.
    pub async fn send_stream<R>(&self, reader: R) -> Result<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        AudioFeeder::realtime().feed(&self.session, reader).await
    }

    /// Stream a file-backed source, sleeping `interval` after each
    /// `chunk_size` bytes to approximate the real-time rate.
    pub async fn send_paced<R>(&self, reader: R, chunk_size: usize, interval: Duration) -> Result<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        AudioFeeder::paced(chunk_size, interval)
            .feed(&self.session, reader)
            .await
    }

    /// Send the stop command and wait for the final result (bounded at 10
    /// seconds). A no-op if the server already concluded the task.
    pub async fn stop(&self) -> Result<()> {
        self.session.stop().await
    }

    /// Close the underlying connection.
    pub async fn close(&self) {
        self.session.close().await;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TaskState {
        self.session.state()
    }

    /// Task id bound at `start`.
    pub fn task_id(&self) -> Option<String> {
        self.session.task_id()
    }

    /// Set an advanced request parameter not covered by the config.
    pub fn add_custom_param(&mut self, key: &str, value: Value) {
        self.request.set_payload_field(key, value);
    }

    /// Attach caller context (device info, trace ids) to the request.
    pub fn put_context(&mut self, key: &str, value: Value) {
        self.request.set_context_field(key, value);
    }
}
