pub mod audio;
pub mod dialog;
pub mod listener;
pub mod protocol;
pub mod recognizer;
pub mod synthesizer;
pub mod transcriber;

// Re-export commonly used types for convenience
pub use audio::{DEFAULT_CHUNK_SIZE, DEFAULT_SAMPLE_RATE, InputFormat, OutputFormat};
pub use dialog::{DialogAssistant, DialogConfig};
pub use listener::EventListener;
pub use protocol::envelope::{Envelope, MessageHeader};
pub use protocol::state::TaskState;
pub use recognizer::{RecognizerConfig, SpeechRecognizer};
pub use synthesizer::{SpeechSynthesizer, SynthesizerConfig};
pub use transcriber::{SpeechTranscriber, TranscriberConfig};
