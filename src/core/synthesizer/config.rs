//! Synthesis request parameters.

use serde_json::{Map, Value, json};

use crate::core::audio::{DEFAULT_SAMPLE_RATE, OutputFormat};

/// Configuration for a [`SpeechSynthesizer`](super::SpeechSynthesizer) task.
#[derive(Debug, Clone)]
pub struct SynthesizerConfig {
    /// Application key of the calling project. Required.
    pub app_key: String,
    /// Output audio encoding.
    pub format: OutputFormat,
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Voice to synthesize with; the service default when unset.
    pub voice: Option<String>,
    /// Volume, 0 to 100.
    pub volume: i32,
    /// Speech rate, -500 to 500.
    pub speech_rate: i32,
    /// Pitch, -500 to 500.
    pub pitch_rate: i32,
    /// Synthesis method: 0 parametric, 1 concatenative.
    pub method: i32,
}

impl SynthesizerConfig {
    /// Defaults: pcm, 16000 Hz, volume 50, neutral rate and pitch.
    pub fn new(app_key: impl Into<String>) -> Self {
        Self {
            app_key: app_key.into(),
            format: OutputFormat::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            voice: None,
            volume: 50,
            speech_rate: 0,
            pitch_rate: 0,
            method: 0,
        }
    }

    pub(crate) fn payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("format".to_string(), json!(self.format.as_str()));
        payload.insert("sample_rate".to_string(), json!(self.sample_rate));
        payload.insert("volume".to_string(), json!(self.volume));
        payload.insert("speech_rate".to_string(), json!(self.speech_rate));
        payload.insert("pitch_rate".to_string(), json!(self.pitch_rate));
        payload.insert("method".to_string(), json!(self.method));
        if let Some(voice) = &self.voice {
            payload.insert("voice".to_string(), json!(voice));
        }
        payload
    }
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self::new("")
    }
}
