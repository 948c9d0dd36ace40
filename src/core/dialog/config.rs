//! Dialog request parameters.

use serde_json::{Map, Value, json};

use crate::core::audio::{DEFAULT_SAMPLE_RATE, InputFormat};

/// Configuration for a [`DialogAssistant`](super::DialogAssistant) session.
#[derive(Debug, Clone)]
pub struct DialogConfig {
    /// Application key of the calling project. Required.
    pub app_key: String,
    /// Input audio encoding for voice turns.
    pub format: InputFormat,
    /// Input sample rate in Hz (8000 or 16000).
    pub sample_rate: u32,
    /// Dialog context id carried across turns.
    pub session_id: Option<String>,
    /// Serialized dialog context from a previous exchange.
    pub query_context: Option<String>,
    /// Wake word to verify before the exchange proceeds.
    pub wake_word: Option<String>,
    /// Model name for the wake-word verification service.
    pub wake_word_model: Option<String>,
    /// Run the wake-word verification sub-protocol.
    pub enable_wake_word_verification: bool,
    /// Route recognition across multiple groups (the v2 protocol variant).
    pub multi_group: bool,
}

impl DialogConfig {
    /// Defaults: pcm, 16000 Hz, no wake word, single group.
    pub fn new(app_key: impl Into<String>) -> Self {
        Self {
            app_key: app_key.into(),
            format: InputFormat::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            session_id: None,
            query_context: None,
            wake_word: None,
            wake_word_model: None,
            enable_wake_word_verification: false,
            multi_group: false,
        }
    }

    pub(crate) fn payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("format".to_string(), json!(self.format.as_str()));
        payload.insert("sample_rate".to_string(), json!(self.sample_rate));
        payload.insert("query_params".to_string(), json!([]));
        payload.insert(
            "enable_wake_word_verification".to_string(),
            json!(self.enable_wake_word_verification),
        );
        if let Some(session_id) = &self.session_id {
            payload.insert("session_id".to_string(), json!(session_id));
        }
        if let Some(query_context) = &self.query_context {
            payload.insert("query_context".to_string(), json!(query_context));
        }
        if let Some(wake_word) = &self.wake_word {
            payload.insert("wake_word".to_string(), json!(wake_word));
        }
        if let Some(model) = &self.wake_word_model {
            payload.insert("wake_word_model".to_string(), json!(model));
        }
        payload
    }
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_payload() {
        let payload = DialogConfig::new("app").payload();
        assert_eq!(payload["format"], "pcm");
        assert_eq!(payload["enable_wake_word_verification"], false);
        assert!(payload["query_params"].as_array().unwrap().is_empty());
        assert!(!payload.contains_key("wake_word"));
    }

    #[test]
    fn test_wake_word_options_in_payload() {
        let config = DialogConfig {
            wake_word: Some("hey gadget".to_string()),
            wake_word_model: Some("gadget-v1".to_string()),
            enable_wake_word_verification: true,
            ..DialogConfig::new("app")
        };
        let payload = config.payload();
        assert_eq!(payload["wake_word"], "hey gadget");
        assert_eq!(payload["wake_word_model"], "gadget-v1");
        assert_eq!(payload["enable_wake_word_verification"], true);
    }
}
