//! Text-to-speech synthesis: the server pushes audio as binary frames.

mod client;
mod config;

pub use client::SpeechSynthesizer;
pub use config::SynthesizerConfig;
