//! # speechlink
//!
//! Client SDK for a cloud speech gateway: open a persistent WebSocket,
//! issue one of four request flavors (one-shot recognition, long-form
//! transcription, multi-turn dialog, or speech synthesis), stream binary
//! audio, and receive asynchronous JSON protocol events that drive each
//! task's state machine to completion.
//!
//! Every flavor shares the same lifecycle
//! (`Connected → RequestSent → RequestConfirmed → StopSent → Complete`,
//! with `Fail`/`Closed` reachable from any non-terminal state) and the
//! same correlation rules: a caller blocking on a milestone is released
//! exactly once, by the matching event, a task failure, a timeout, or the
//! connection closing. It is never left hanging.
//!
//! ```rust,no_run
//! use speechlink::{EventListener, RecognizerConfig, SpeechClient, SpeechRecognizer};
//! use std::sync::Arc;
//!
//! struct Handler;
//!
//! #[async_trait::async_trait]
//! impl EventListener for Handler {
//!     async fn on_completed(&self, response: speechlink::Envelope) {
//!         println!("final result: {:?}", response.payload_str("result"));
//!     }
//! }
//!
//! # async fn run(audio_chunks: Vec<Vec<u8>>) -> speechlink::Result<()> {
//! let client = SpeechClient::new("access-token");
//! let mut recognizer =
//!     SpeechRecognizer::new(&client, RecognizerConfig::new("app-key"), Arc::new(Handler))
//!         .await?;
//! recognizer.start().await?;
//! for chunk in audio_chunks {
//!     recognizer.send(chunk).await?;
//! }
//! recognizer.stop().await?;
//! recognizer.close().await;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod core;
pub mod error;
pub mod transport;

// Re-export commonly used items for convenience
pub use crate::client::{DEFAULT_GATEWAY_URL, SpeechClient};
pub use crate::core::audio::{DEFAULT_CHUNK_SIZE, DEFAULT_SAMPLE_RATE, InputFormat, OutputFormat};
pub use crate::core::dialog::{DialogAssistant, DialogConfig};
pub use crate::core::listener::EventListener;
pub use crate::core::protocol::envelope::{Envelope, MessageHeader};
pub use crate::core::protocol::state::{Operation, TaskState};
pub use crate::core::recognizer::{RecognizerConfig, SpeechRecognizer};
pub use crate::core::synthesizer::{SpeechSynthesizer, SynthesizerConfig};
pub use crate::core::transcriber::{SpeechTranscriber, TranscriberConfig};
pub use crate::error::{Result, SpeechError};
pub use crate::transport::{Connection, TransportError, TransportEvent};
