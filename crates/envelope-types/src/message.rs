//! Tagged message types.
//!
//! A [`TaggedMessage`] is the payload exchanged over the transport. Every
//! variant shares the resource id and the header map; variant-specific fields
//! live in [`MessageBody`].

use crate::builder::{CommonBuilder, NotificationBuilder};
use crate::headers::Headers;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A message payload carrying a resource id, in-payload headers and a body.
///
/// Instances are created through the per-variant builders
/// ([`TaggedMessage::notification`], [`TaggedMessage::common`]) or decoded
/// from the wire with [`crate::codec::decode`]. Two messages are equal when
/// every field, headers included, is equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedMessage {
    resource_id: String,
    #[serde(default, skip_serializing_if = "Headers::is_empty")]
    headers: Headers,
    #[serde(flatten)]
    body: MessageBody,
}

/// Variant-specific part of a [`TaggedMessage`].
///
/// Encoded inline next to `resource_id` and `headers`, discriminated by the
/// `type` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageBody {
    Notification(Notification),
    Common(Common),
}

impl MessageBody {
    /// Variant-specific keys on the wire for the given `type` value.
    pub fn fields_of(kind: &str) -> Option<&'static [&'static str]> {
        match kind {
            "notification" => Some(&["url", "action"]),
            "common" => Some(&["content"]),
            _ => None,
        }
    }
}

/// Notification about an action performed on a remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub url: String,
    pub action: String,
}

/// Plain content message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Common {
    pub content: String,
}

impl TaggedMessage {
    pub(crate) fn from_parts(resource_id: String, headers: Headers, body: MessageBody) -> Self {
        Self {
            resource_id,
            headers,
            body,
        }
    }

    /// Start building a notification message.
    pub fn notification() -> NotificationBuilder {
        NotificationBuilder::default()
    }

    /// Start building a common message.
    pub fn common() -> CommonBuilder {
        CommonBuilder::default()
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Current headers. Empty if none were ever added.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    /// Variant name as written to the `type` key.
    pub fn kind(&self) -> &'static str {
        match self.body {
            MessageBody::Notification(_) => "notification",
            MessageBody::Common(_) => "common",
        }
    }

    pub fn as_notification(&self) -> Option<&Notification> {
        match &self.body {
            MessageBody::Notification(notification) => Some(notification),
            _ => None,
        }
    }

    pub fn as_common(&self) -> Option<&Common> {
        match &self.body {
            MessageBody::Common(common) => Some(common),
            _ => None,
        }
    }

    /// Insert or overwrite a single header.
    pub fn add_header(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.headers.insert(key, value);
        self
    }

    /// Merge a batch of headers, overwriting colliding keys.
    pub fn add_headers<I, K, V>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.headers.merge(entries);
        self
    }

    /// Split the message into resource id, headers and body.
    pub fn into_parts(self) -> (String, Headers, MessageBody) {
        (self.resource_id, self.headers, self.body)
    }
}

/// Renders the JSON wire form.
impl fmt::Display for TaggedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TaggedMessageBuilder;
    use serde_json::json;

    fn notification(resource_id: &str) -> TaggedMessage {
        TaggedMessage::notification()
            .url("http://example.com/endpoint")
            .action("create")
            .resource_id(resource_id)
            .build()
            .unwrap()
    }

    #[test]
    fn test_headers_empty_without_writes() {
        let message = notification("1");
        assert!(message.headers().is_empty());
        assert_eq!(message.headers().get("my_header1"), None);
    }

    #[test]
    fn test_add_header_on_built_message() {
        let mut message = notification("1");
        message
            .add_header("k", "v1")
            .add_header("k", "v2")
            .add_headers([("other", json!(7))]);

        assert_eq!(message.headers().len(), 2);
        assert_eq!(message.headers().get_str("k"), Some("v2"));
        assert_eq!(message.headers().get("other"), Some(&json!(7)));
    }

    #[test]
    fn test_equality_includes_headers() {
        let plain = notification("1");
        let mut annotated = notification("1");
        assert_eq!(plain, annotated);

        annotated.add_header("trace", "abc");
        assert_ne!(plain, annotated);
        assert_ne!(notification("1"), notification("2"));
    }

    #[test]
    fn test_display_renders_wire_json() {
        let mut message = notification("1");
        message.add_header("my_header1", "value 1");

        let rendered: Value = serde_json::from_str(&message.to_string()).unwrap();
        assert_eq!(
            rendered,
            json!({
                "resource_id": "1",
                "headers": {"my_header1": "value 1"},
                "type": "notification",
                "url": "http://example.com/endpoint",
                "action": "create",
            })
        );
    }

    #[test]
    fn test_fields_of_matches_encoded_keys() {
        let messages = [
            notification("1"),
            TaggedMessage::common()
                .content("hello")
                .resource_id("1")
                .build()
                .unwrap(),
        ];

        for message in messages {
            let encoded = serde_json::to_value(&message).unwrap();
            let mut keys: Vec<&str> = encoded
                .as_object()
                .unwrap()
                .keys()
                .map(String::as_str)
                .filter(|k| !["resource_id", "headers", "type"].contains(k))
                .collect();
            keys.sort_unstable();

            let mut expected = MessageBody::fields_of(message.kind()).unwrap().to_vec();
            expected.sort_unstable();
            assert_eq!(keys, expected);
        }
        assert!(MessageBody::fields_of("person").is_none());
    }

    #[test]
    fn test_variant_accessors() {
        let message = notification("1");
        assert_eq!(message.kind(), "notification");
        assert_eq!(
            message.as_notification().map(|n| n.action.as_str()),
            Some("create")
        );
        assert!(message.as_common().is_none());

        let common = TaggedMessage::common()
            .content("hello")
            .resource_id("9")
            .build()
            .unwrap();
        assert_eq!(common.kind(), "common");
        assert_eq!(common.as_common().map(|c| c.content.as_str()), Some("hello"));
    }
}
