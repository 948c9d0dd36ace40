//! Request/response message model.
//!
//! Every frame exchanged with the gateway is one JSON envelope: a `header`
//! identifying the event or command, an optional flavor-specific `payload`,
//! and an optional `context` carrying SDK metadata. `header.name` is the
//! sole driver of state transitions and listener dispatch.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Generate an opaque 32-character id for `message_id`/`task_id`.
pub(crate) fn gen_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Envelope header.
///
/// Unknown fields round-trip through `extra`, so protocol extensions (for
/// example the dialog v2 `enable_multi_group` flag) survive re-serialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageHeader {
    /// Unique id of this message.
    #[serde(default)]
    pub message_id: String,
    /// Protocol namespace, e.g. `SpeechRecognizer`.
    #[serde(default)]
    pub namespace: String,
    /// Event/command name, e.g. `StartRecognition`.
    #[serde(default)]
    pub name: String,
    /// Application key of the calling project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appkey: Option<String>,
    /// Id of the task this message belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    /// Status code on server responses (2xxxxxxx is success).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u32>,
    /// Human-readable status description on server responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    /// Any further header fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// One protocol message: header plus optional payload and context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Message header; always present.
    pub header: MessageHeader,
    /// Flavor-specific request parameters or response fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Map<String, Value>>,
    /// SDK/client metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
}

impl Envelope {
    /// Build a request envelope with a fresh message id and the SDK
    /// identification seeded into the context.
    pub fn request(namespace: &str, name: &str) -> Self {
        let mut context = Map::new();
        context.insert(
            "sdk".to_string(),
            json!({
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            }),
        );
        Self {
            header: MessageHeader {
                message_id: gen_id(),
                namespace: namespace.to_string(),
                name: name.to_string(),
                ..Default::default()
            },
            payload: Some(Map::new()),
            context: Some(context),
        }
    }

    /// Serialize for the wire. `payload` and `context` are emitted only when
    /// a payload is present; a bare command serializes as header-only.
    pub fn to_json(&self) -> serde_json::Result<String> {
        if self.payload.is_some() {
            serde_json::to_string(self)
        } else {
            #[derive(Serialize)]
            struct HeaderOnly<'a> {
                header: &'a MessageHeader,
            }
            serde_json::to_string(&HeaderOnly {
                header: &self.header,
            })
        }
    }

    /// Parse an inbound text frame.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Event/command name from the header.
    pub fn name(&self) -> &str {
        &self.header.name
    }

    /// Task id from the header, if any.
    pub fn task_id(&self) -> Option<&str> {
        self.header.task_id.as_deref()
    }

    /// Status code from the header, if any.
    pub fn status(&self) -> Option<u32> {
        self.header.status
    }

    /// Status text from the header, if any.
    pub fn status_text(&self) -> Option<&str> {
        self.header.status_text.as_deref()
    }

    /// Insert a payload field, creating the payload map if needed.
    pub fn set_payload_field(&mut self, key: &str, value: Value) {
        self.payload
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value);
    }

    /// Insert a context field, creating the context map if needed.
    pub fn set_context_field(&mut self, key: &str, value: Value) {
        self.context
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value);
    }

    /// String payload field by key.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.as_ref()?.get(key)?.as_str()
    }

    /// Integer payload field by key.
    pub fn payload_i64(&self, key: &str) -> Option<i64> {
        self.payload.as_ref()?.get(key)?.as_i64()
    }

    /// Raw payload field by key.
    pub fn payload_value(&self, key: &str) -> Option<&Value> {
        self.payload.as_ref()?.get(key)
    }
}
