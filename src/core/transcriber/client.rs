//! Long-form transcription client.

use bytes::Bytes;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncRead;

use super::config::TranscriberConfig;
use crate::client::SpeechClient;
use crate::core::audio::AudioFeeder;
use crate::core::listener::EventListener;
use crate::core::protocol::envelope::Envelope;
use crate::core::protocol::flavor::TRANSCRIBER;
use crate::core::protocol::session::SessionCore;
use crate::core::protocol::state::TaskState;
use crate::error::{Result, SpeechError};

/// Client for one long-running transcription task.
///
/// Shaped like [`SpeechRecognizer`](crate::SpeechRecognizer) but streams a
/// sequence of `TranscriptionResultChanged` and sentence-boundary events to
/// the listener while audio flows; none of those affect the task state.
/// Not intended for concurrent use by multiple callers.
pub struct SpeechTranscriber {
    session: Arc<SessionCore>,
    request: Envelope,
}

impl SpeechTranscriber {
    /// Open a connection and bind a new transcription task to it.
    pub async fn new(
        client: &SpeechClient,
        config: TranscriberConfig,
        listener: Arc<dyn EventListener>,
    ) -> Result<Self> {
        if config.app_key.is_empty() {
            return Err(SpeechError::Configuration("app_key is required".to_string()));
        }

        let (conn, events) = client.open().await?;
        let session = Arc::new(SessionCore::new(
            TRANSCRIBER,
            Arc::new(conn),
            Some(config.app_key.clone()),
        ));
        session.mark_connected();
        tokio::spawn(SessionCore::pump(session.clone(), events, listener));

        let mut request = Envelope::request(TRANSCRIBER.namespace, TRANSCRIBER.start_request);
        request.header.appkey = Some(config.app_key.clone());
        request.payload = Some(config.payload());

        Ok(Self { session, request })
    }

    /// Send the transcription request and wait for the server's
    /// confirmation (bounded at 10 seconds).
    pub async fn start(&mut self) -> Result<()> {
        self.session.start(&mut self.request).await
    }

    /// Stream one audio chunk. The caller controls the send rate.
    pub async fn send(&self, data: impl Into<Bytes>) -> Result<()> {
        self.session.send_audio(data.into()).await
    }

    /// Stream a continuous capture source to exhaustion.
    pub async fn send_stream<R>(&self, reader: R) -> Result<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        AudioFeeder::realtime().feed(&self.session, reader).await
    }

    /// Stream a file-backed source with per-chunk pacing. For 16k PCM,
    /// 6400 bytes every 200 ms approximates real time.
    pub async fn send_paced<R>(&self, reader: R, chunk_size: usize, interval: Duration) -> Result<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        AudioFeeder::paced(chunk_size, interval)
            .feed(&self.session, reader)
            .await
    }

    /// Send the stop command and wait for the final completion (bounded at
    /// 10 seconds). A no-op if the server already concluded the task.
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

    /// Attach caller context to the request.
    pub fn put_context(&mut self, key: &str, value: Value) {
        self.request.set_context_field(key, value);
    }
}
