//! Long-form real-time transcription with sentence boundary events.

mod client;
mod config;

pub use client::SpeechTranscriber;
pub use config::TranscriberConfig;
