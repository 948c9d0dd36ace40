//! Caller-facing event callbacks.
//!
//! One listener instance is bound to one task at construction and receives
//! every inbound event for that task, already classified by the session
//! core. All methods default to no-ops so implementors only override what
//! they consume.

use async_trait::async_trait;
use bytes::Bytes;

use crate::core::protocol::envelope::Envelope;

/// Receiver for the asynchronous events of one task.
///
/// Callbacks are invoked from the connection's event loop, one at a time,
/// in wire order. They should return quickly; long work belongs on a
/// separate task fed from the callback.
#[async_trait]
pub trait EventListener: Send + Sync {
    /// The server confirmed the start request; audio may flow.
    async fn on_started(&self, _response: Envelope) {}

    /// An intermediate result with no lifecycle impact (result-changed,
    /// sentence boundaries, mid-dialog recognition results).
    async fn on_event(&self, _response: Envelope) {}

    /// The task concluded normally; final results are in the payload.
    async fn on_completed(&self, _response: Envelope) {}

    /// Wake-word verification finished (dialog only). Return `true` to
    /// accept the wake word and continue the task; returning `false`
    /// concludes the task early.
    async fn on_wake_word_verified(&self, _response: Envelope) -> bool {
        false
    }

    /// The server reported a task failure.
    async fn on_failed(&self, _status: u32, _reason: &str) {}

    /// The transport failed; the task will not make further progress.
    async fn on_error(&self, _message: &str) {}

    /// A binary frame from the server (synthesized audio).
    async fn on_binary(&self, _data: Bytes) {}

    /// The connection closed.
    async fn on_closed(&self, _code: u16, _reason: &str) {}
}
