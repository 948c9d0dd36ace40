//! Per-flavor protocol vocabulary and policy switches.
//!
//! The four task flavors share one session core and differ only in the
//! event names on the wire, the request names they emit, and two policy
//! flags. Each flavor is one [`FlavorSpec`] constant; classification of an
//! inbound event name is a pure lookup within that flavor's own table, so
//! a name from another flavor's vocabulary is never matched.

/// Failure event name shared by every namespace.
pub(crate) const TASK_FAILED: &str = "TaskFailed";

/// What an inbound event means to the session core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EventKind {
    /// The server confirmed the start request.
    Started,
    /// Result data with no state impact; forwarded to the listener.
    Intermediate,
    /// The task finished; terminal transition to `Complete`.
    Completed,
    /// Wake-word verification finished (dialog only).
    VerificationCompleted,
    /// The server reported a failure; terminal transition to `Fail`.
    TaskFailed,
    /// Not part of this flavor's vocabulary; logged and ignored.
    Unknown,
}

/// Policy for a `send` issued after the task already completed.
///
/// The two behaviors are deliberate per-flavor choices: one-shot
/// recognition races server-side silence detection against in-flight audio
/// and drops quietly; the streaming flavors treat it as caller error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SendAfterComplete {
    /// Log and return `Ok(())` without touching the wire.
    Drop,
    /// Reject with `IllegalState`.
    Reject,
}

/// Static description of one protocol flavor.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FlavorSpec {
    /// Short name used in logs.
    pub label: &'static str,
    /// Protocol namespace for requests.
    pub namespace: &'static str,
    /// Request name sent by `start`.
    pub start_request: &'static str,
    /// Request name sent by `stop` (absent for synthesis).
    pub stop_request: Option<&'static str>,
    /// Event confirming the start request.
    pub started_event: &'static str,
    /// Event concluding the task.
    pub completed_event: &'static str,
    /// Wake-word verification event (dialog only).
    pub verification_event: Option<&'static str>,
    /// Events forwarded to the listener without state impact.
    pub intermediate_events: &'static [&'static str],
    /// Whether `start` blocks until the started event arrives.
    pub start_blocks: bool,
    /// Policy for `send` after completion.
    pub send_after_complete: SendAfterComplete,
}

impl FlavorSpec {
    /// Classify an inbound event name against this flavor's vocabulary.
    pub fn classify(&self, name: &str) -> EventKind {
        if name == self.started_event {
            EventKind::Started
        } else if name == self.completed_event {
            EventKind::Completed
        } else if self.verification_event == Some(name) {
            EventKind::VerificationCompleted
        } else if self.intermediate_events.contains(&name) {
            EventKind::Intermediate
        } else if name == TASK_FAILED {
            EventKind::TaskFailed
        } else {
            EventKind::Unknown
        }
    }
}

/// One-shot speech recognition.
pub(crate) const RECOGNIZER: FlavorSpec = FlavorSpec {
    label: "recognizer",
    namespace: "SpeechRecognizer",
    start_request: "StartRecognition",
    stop_request: Some("StopRecognition"),
    started_event: "RecognitionStarted",
    completed_event: "RecognitionCompleted",
    verification_event: None,
    intermediate_events: &["RecognitionResultChanged"],
    start_blocks: true,
    send_after_complete: SendAfterComplete::Drop,
};

/// Long-form real-time transcription.
pub(crate) const TRANSCRIBER: FlavorSpec = FlavorSpec {
    label: "transcriber",
    namespace: "SpeechTranscriber",
    start_request: "StartTranscription",
    stop_request: Some("StopTranscription"),
    started_event: "TranscriptionStarted",
    completed_event: "TranscriptionCompleted",
    verification_event: None,
    intermediate_events: &[
        "TranscriptionResultChanged",
        "SentenceBegin",
        "SentenceEnd",
        "SentenceSemantics",
    ],
    start_blocks: true,
    send_after_complete: SendAfterComplete::Reject,
};

/// Multi-turn dialog. A turn concludes on `DialogResultGenerated`;
/// `RecognitionCompleted` is only an intermediate milestone here.
pub(crate) const DIALOG: FlavorSpec = FlavorSpec {
    label: "dialog",
    namespace: "DialogAssistant",
    start_request: "StartRecognition",
    stop_request: Some("StopRecognition"),
    started_event: "RecognitionStarted",
    completed_event: "DialogResultGenerated",
    verification_event: Some("WakeWordVerificationCompleted"),
    intermediate_events: &["RecognitionResultChanged", "RecognitionCompleted"],
    start_blocks: true,
    send_after_complete: SendAfterComplete::Reject,
};

/// Dialog variant flagging multi-group routing; identical behavior under a
/// different namespace.
pub(crate) const DIALOG_V2: FlavorSpec = FlavorSpec {
    label: "dialog",
    namespace: "DialogAssistant.v2",
    start_request: "StartRecognition",
    stop_request: Some("StopRecognition"),
    started_event: "RecognitionStarted",
    completed_event: "DialogResultGenerated",
    verification_event: Some("WakeWordVerificationCompleted"),
    intermediate_events: &["RecognitionResultChanged", "RecognitionCompleted"],
    start_blocks: true,
    send_after_complete: SendAfterComplete::Reject,
};

/// Speech synthesis. `start` does not block; completion is observed via an
/// explicit wait. The server pushes audio as binary frames.
pub(crate) const SYNTHESIZER: FlavorSpec = FlavorSpec {
    label: "synthesizer",
    namespace: "SpeechSynthesizer",
    start_request: "StartSynthesis",
    stop_request: None,
    started_event: "SynthesisStarted",
    completed_event: "SynthesisCompleted",
    verification_event: None,
    intermediate_events: &[],
    start_blocks: false,
    send_after_complete: SendAfterComplete::Reject,
};
