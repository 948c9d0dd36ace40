//! Task lifecycle states and the operation/state transition table.
//!
//! The table is a pure function so it can be audited and tested as data:
//! an operation is either allowed in the current state or rejected with
//! [`SpeechError::IllegalState`] naming that state. Transitions themselves
//! are performed by the session core.

use std::fmt;

use crate::error::SpeechError;

/// Lifecycle state of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// No connection exists yet.
    Init,
    /// Connection established; ready for `start`.
    Connected,
    /// Start request sent, awaiting server confirmation.
    RequestSent,
    /// Server confirmed the request; audio may flow.
    RequestConfirmed,
    /// Stop command sent, awaiting final completion.
    StopSent,
    /// Task finished normally. Terminal.
    Complete,
    /// The server reported a task failure. Terminal.
    Fail,
    /// The connection closed. Terminal.
    Closed,
}

impl TaskState {
    /// Whether no further transitions can occur from this state.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Complete | TaskState::Fail | TaskState::Closed)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskState::Init => "Init",
            TaskState::Connected => "Connected",
            TaskState::RequestSent => "RequestSent",
            TaskState::RequestConfirmed => "RequestConfirmed",
            TaskState::StopSent => "StopSent",
            TaskState::Complete => "Complete",
            TaskState::Fail => "Fail",
            TaskState::Closed => "Closed",
        };
        f.write_str(name)
    }
}

/// Caller-initiated operations gated by the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Send the start request.
    Start,
    /// Stream a binary audio chunk.
    Send,
    /// Send the stop command.
    Stop,
}

impl Operation {
    /// Name used in error messages and logs.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Start => "start",
            Operation::Send => "send",
            Operation::Stop => "stop",
        }
    }
}

/// The §transition table: which operation is legal from which state.
pub fn check(state: TaskState, operation: Operation) -> Result<(), SpeechError> {
    let allowed = matches!(
        (operation, state),
        (Operation::Start, TaskState::Connected)
            | (Operation::Send, TaskState::RequestConfirmed)
            | (Operation::Stop, TaskState::RequestConfirmed)
    );
    if allowed {
        Ok(())
    } else {
        Err(SpeechError::IllegalState {
            operation: operation.name(),
            state,
        })
    }
}
