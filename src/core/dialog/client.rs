//! Dialog assistant client.

use bytes::Bytes;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncRead;

use super::config::DialogConfig;
use crate::client::SpeechClient;
use crate::core::audio::AudioFeeder;
use crate::core::listener::EventListener;
use crate::core::protocol::envelope::Envelope;
use crate::core::protocol::flavor::{DIALOG, DIALOG_V2};
use crate::core::protocol::session::SessionCore;
use crate::core::protocol::state::TaskState;
use crate::error::{Result, SpeechError};

/// Request name for a text turn.
const EXECUTE_DIALOG: &str = "ExecuteDialog";
/// Request name ending the wake-word verification phase.
const STOP_WAKE_WORD_VERIFICATION: &str = "StopWakeWordVerification";
/// Header flag selecting multi-group routing in the v2 variant.
const MULTI_GROUP_HEADER: &str = "enable_multi_group";

/// Client for a multi-turn dialog session.
///
/// One connection hosts a sequence of exchanges: an initial voice `start`,
/// then any number of `query` text turns, each concluding on its own
/// `DialogResultGenerated` event. With `multi_group` set in the config the
/// v2 protocol variant is spoken; only the namespace and one header flag
/// differ. Not intended for concurrent use by multiple callers.
pub struct DialogAssistant {
    session: Arc<SessionCore>,
    request: Envelope,
}

impl DialogAssistant {
    /// Open a connection and bind a new dialog session to it.
    pub async fn new(
        client: &SpeechClient,
        config: DialogConfig,
        listener: Arc<dyn EventListener>,
    ) -> Result<Self> {
        if config.app_key.is_empty() {
            return Err(SpeechError::Configuration("app_key is required".to_string()));
        }

        let spec = if config.multi_group { DIALOG_V2 } else { DIALOG };
        let (conn, events) = client.open().await?;
        let session = Arc::new(SessionCore::new(
            spec,
            Arc::new(conn),
            Some(config.app_key.clone()),
        ));
        session.mark_connected();
        tokio::spawn(SessionCore::pump(session.clone(), events, listener));

        let mut request = Envelope::request(spec.namespace, spec.start_request);
        request.header.appkey = Some(config.app_key.clone());
        if config.multi_group {
            request
                .header
                .extra
                .insert(MULTI_GROUP_HEADER.to_string(), "true".to_string());
        }
        request.payload = Some(config.payload());

        Ok(Self { session, request })
    }

    /// Send the dialog start request and wait for the server's confirmation
    /// (bounded at 10 seconds).
    pub async fn start(&mut self) -> Result<()> {
        self.session.start(&mut self.request).await
    }

    /// Stream one audio chunk of the current voice turn.
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

    /// Stream a file-backed source with per-chunk pacing.
    pub async fn send_paced<R>(&self, reader: R, chunk_size: usize, interval: Duration) -> Result<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        AudioFeeder::paced(chunk_size, interval)
            .feed(&self.session, reader)
            .await
    }

    /// End the voice turn and wait for the dialog result (bounded at 10
    /// seconds).
    pub async fn stop(&self) -> Result<()> {
        self.session.stop().await
    }

    /// End the wake-word verification phase and wait for its outcome
    /// (bounded at 10 seconds). The listener's
    /// [`on_wake_word_verified`](EventListener::on_wake_word_verified)
    /// decides acceptance; a rejected wake word concludes the task.
    pub async fn stop_wake_word_verification(&self) -> Result<()> {
        self.session
            .stop_verification(STOP_WAKE_WORD_VERIFICATION)
            .await
    }

    /// Run one text turn: send `text` as an `ExecuteDialog` request under a
    /// fresh task id and wait for the generated result (bounded at 10
    /// seconds). Legal once the session is confirmed, including after a
    /// previous turn completed.
    pub async fn query(&mut self, text: &str) -> Result<()> {
        self.request.header.name = EXECUTE_DIALOG.to_string();
        self.request.set_payload_field("query", json!(text));
        self.session.execute_turn(&mut self.request).await
    }

    /// Wait without bound for the current turn's result. The unbounded wait
    /// is an explicit choice; `stop`/`query` already bound theirs.
    pub async fn wait_for_complete(&self) -> Result<()> {
        self.session.wait_for_complete(None, false).await
    }

    /// Whether the listener accepted the wake word.
    pub fn is_wake_word_verified(&self) -> bool {
        self.session.wake_word_accepted()
    }

    /// Close the underlying connection.
    pub async fn close(&self) {
        self.session.close().await;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TaskState {
        self.session.state()
    }

    /// Task id of the current turn.
    pub fn task_id(&self) -> Option<String> {
        self.session.task_id()
    }

    /// Append a name/value pair to the dialog's `query_params`.
    pub fn add_dialog_param(&mut self, name: &str, value: Value) -> &mut Self {
        let params = self
            .request
            .payload
            .get_or_insert_with(serde_json::Map::new)
            .entry("query_params".to_string())
            .or_insert_with(|| json!([]));
        if let Some(list) = params.as_array_mut() {
            list.push(json!({ "name": name, "value": value }));
        }
        self
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
