//! One-shot speech recognition: a single short utterance per task.

mod client;
mod config;

pub use client::SpeechRecognizer;
pub use config::RecognizerConfig;
