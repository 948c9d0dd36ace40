//! Speech synthesis client.

use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

use super::config::SynthesizerConfig;
use crate::client::SpeechClient;
use crate::core::listener::EventListener;
use crate::core::protocol::envelope::Envelope;
use crate::core::protocol::flavor::SYNTHESIZER;
use crate::core::protocol::session::SessionCore;
use crate::core::protocol::state::TaskState;
use crate::error::{Result, SpeechError};

/// Client for one text-to-speech task.
///
/// `start` returns as soon as the request is on the wire; synthesized audio
/// then arrives asynchronously through
/// [`on_binary`](EventListener::on_binary) (playback is the caller's
/// concern), and the end of the stream is observed with
/// [`wait_for_complete`](Self::wait_for_complete). Not intended for
/// concurrent use by multiple callers.
///
/// # Example
///
/// ```rust,no_run
/// use speechlink::{EventListener, SpeechClient, SpeechSynthesizer, SynthesizerConfig};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// struct Sink;
///
/// #[async_trait::async_trait]
/// impl EventListener for Sink {
///     async fn on_binary(&self, data: bytes::Bytes) {
///         // write the audio frame somewhere
///         let _ = data;
///     }
/// }
///
/// # async fn run() -> speechlink::Result<()> {
/// let client = SpeechClient::new("your-access-token");
/// let mut tts = SpeechSynthesizer::new(
///     &client,
///     SynthesizerConfig::new("your-app-key"),
///     Arc::new(Sink),
/// )
/// .await?;
/// tts.start("hello out there").await?;
/// tts.wait_for_complete(Some(Duration::from_secs(30))).await?;
/// tts.close().await;
/// # Ok(())
/// # }
/// ```
pub struct SpeechSynthesizer {
    session: Arc<SessionCore>,
    request: Envelope,
}

impl SpeechSynthesizer {
    /// Open a connection and bind a new synthesis task to it.
    pub async fn new(
        client: &SpeechClient,
        config: SynthesizerConfig,
        listener: Arc<dyn EventListener>,
    ) -> Result<Self> {
        if config.app_key.is_empty() {
            return Err(SpeechError::Configuration("app_key is required".to_string()));
        }

        let (conn, events) = client.open().await?;
        let session = Arc::new(SessionCore::new(
            SYNTHESIZER,
            Arc::new(conn),
            Some(config.app_key.clone()),
        ));
        session.mark_connected();
        tokio::spawn(SessionCore::pump(session.clone(), events, listener));

        let mut request = Envelope::request(SYNTHESIZER.namespace, SYNTHESIZER.start_request);
        request.header.appkey = Some(config.app_key.clone());
        request.payload = Some(config.payload());

        Ok(Self { session, request })
    }

    /// Send the synthesis request for `text`. Returns immediately; audio
    /// and completion arrive asynchronously.
    pub async fn start(&mut self, text: &str) -> Result<()> {
        self.request.set_payload_field("text", json!(text));
        self.session.start(&mut self.request).await
    }

    /// Wait for the synthesis-completed event.
    ///
    /// With a bound, expiry is silent: the call returns `Ok(())` and the
    /// caller inspects its own audio sink. `None` waits forever, an
    /// explicit choice; a failure or connection close still unblocks it.
    pub async fn wait_for_complete(&self, timeout: Option<Duration>) -> Result<()> {
        self.session.wait_for_complete(timeout, true).await
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

    /// Attach caller context to the request.
    pub fn put_context(&mut self, key: &str, value: Value) {
        self.request.set_context_field(key, value);
    }
}
