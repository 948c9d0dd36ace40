//! Error taxonomy for the speechlink client.
//!
//! Every failure is local to one task/connection; the crate never retries on
//! its own. Recovery (reconnect, re-issue) is the caller's responsibility,
//! performed by constructing a new flavor client against a new connection.

use thiserror::Error;

use crate::core::protocol::state::TaskState;
use crate::transport::TransportError;

/// Errors surfaced by flavor clients and the session core.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// An operation was invoked in a state that does not permit it.
    /// Surfaced synchronously; the state is left unchanged.
    #[error("can't {operation}, current state is {state}")]
    IllegalState {
        /// The rejected operation ("start", "send", "stop", ...)
        operation: &'static str,
        /// The state the task was in at the time of the call
        state: TaskState,
    },

    /// A bounded wait expired without the expected event. The state is left
    /// as-is; the caller decides whether to abandon the task.
    #[error("timeout after {seconds} seconds waiting for {milestone} confirmation, task_id: {task_id}")]
    Timeout {
        /// The milestone that was awaited ("start", "complete", ...)
        milestone: &'static str,
        /// Task id of the waiting task (empty if none was assigned yet)
        task_id: String,
        /// The bound that expired
        seconds: u64,
    },

    /// The remote side emitted an explicit `TaskFailed` event.
    #[error("task failed with status {status}: {message}")]
    TaskFailed {
        /// Protocol status code from the failure event header
        status: u32,
        /// `status_text` from the failure event header
        message: String,
    },

    /// The connection closed while an operation was waiting on it.
    #[error("connection closed ({code}): {reason}")]
    ConnectionClosed {
        /// RFC 6455 close code
        code: u16,
        /// Close reason supplied by the peer (may be empty)
        reason: String,
    },

    /// Transport-level failure (handshake, socket, or frame I/O).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol message could not be encoded or decoded.
    #[error("invalid protocol message: {0}")]
    Protocol(#[from] serde_json::Error),

    /// Reading from a caller-supplied audio source failed mid-stream.
    #[error("audio source error: {0}")]
    AudioSource(#[from] std::io::Error),

    /// Invalid client-side configuration or API misuse.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SpeechError>;
