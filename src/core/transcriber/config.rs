//! Transcription request parameters.

use serde_json::{Map, Value, json};

use crate::core::audio::{DEFAULT_SAMPLE_RATE, InputFormat};

/// Configuration for a [`SpeechTranscriber`](super::SpeechTranscriber) task.
#[derive(Debug, Clone)]
pub struct TranscriberConfig {
    /// Application key of the calling project. Required.
    pub app_key: String,
    /// Input audio encoding.
    pub format: InputFormat,
    /// Input sample rate in Hz (8000 or 16000).
    pub sample_rate: u32,
    /// Emit intermediate results within a sentence.
    pub enable_intermediate_result: bool,
    /// Add punctuation to results.
    pub enable_punctuation_prediction: bool,
    /// Convert spelled-out numbers to digits in results.
    pub enable_inverse_text_normalization: bool,
}

impl TranscriberConfig {
    /// Defaults: pcm, 16000 Hz, all result options off.
    pub fn new(app_key: impl Into<String>) -> Self {
        Self {
            app_key: app_key.into(),
            format: InputFormat::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            enable_intermediate_result: false,
            enable_punctuation_prediction: false,
            enable_inverse_text_normalization: false,
        }
    }

    pub(crate) fn payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("format".to_string(), json!(self.format.as_str()));
        payload.insert("sample_rate".to_string(), json!(self.sample_rate));
        payload.insert(
            "enable_intermediate_result".to_string(),
            json!(self.enable_intermediate_result),
        );
        payload.insert(
            "enable_punctuation_prediction".to_string(),
            json!(self.enable_punctuation_prediction),
        );
        payload.insert(
            "enable_inverse_text_normalization".to_string(),
            json!(self.enable_inverse_text_normalization),
        );
        payload
    }
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self::new("")
    }
}
