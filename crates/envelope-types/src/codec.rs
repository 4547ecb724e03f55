//! JSON codec for [`TaggedMessage`].
//!
//! Decoding never fills in defaults for missing required keys: a payload
//! without `resource_id`, without a known `type`, or without the variant's
//! fields is rejected with [`EnvelopeError::Decode`]. Top-level keys other
//! than the reserved ones and the variant's fields are rejected too, so a
//! misspelled `headers` key cannot silently drop the headers.

use crate::error::{EnvelopeError, Result};
use crate::message::{MessageBody, TaggedMessage};
use serde::de::Error as _;
use serde_json::Value;

/// Keys every variant may carry next to its own fields.
const RESERVED_KEYS: [&str; 3] = ["resource_id", "headers", "type"];

/// Encode a message to its JSON wire form.
pub fn encode(message: &TaggedMessage) -> Result<Vec<u8>> {
    serde_json::to_vec(message).map_err(EnvelopeError::Encode)
}

pub fn encode_to_string(message: &TaggedMessage) -> Result<String> {
    serde_json::to_string(message).map_err(EnvelopeError::Encode)
}

/// Decode a message from its JSON wire form.
pub fn decode(payload: &[u8]) -> Result<TaggedMessage> {
    let decoded = serde_json::from_slice::<Value>(payload).and_then(|value| {
        reject_unknown_keys(&value)?;
        serde_json::from_value(value)
    });
    decoded.map_err(|e| {
        tracing::debug!("Rejected payload of {} bytes: {e}", payload.len());
        EnvelopeError::Decode(e)
    })
}

pub fn decode_str(payload: &str) -> Result<TaggedMessage> {
    decode(payload.as_bytes())
}

// Unknown or missing `type` is left to the deserializer to report.
fn reject_unknown_keys(value: &Value) -> std::result::Result<(), serde_json::Error> {
    let Some(object) = value.as_object() else {
        return Ok(());
    };
    let Some(fields) = object
        .get("type")
        .and_then(Value::as_str)
        .and_then(MessageBody::fields_of)
    else {
        return Ok(());
    };

    match object
        .keys()
        .find(|key| !RESERVED_KEYS.contains(&key.as_str()) && !fields.contains(&key.as_str()))
    {
        Some(key) => Err(serde_json::Error::custom(format!("unknown field `{key}`"))),
        None => Ok(()),
    }
}
