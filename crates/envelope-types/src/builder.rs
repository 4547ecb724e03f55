//! Builders for [`TaggedMessage`] variants.
//!
//! Every variant builder implements [`TaggedMessageBuilder`], which provides
//! the shared resource-id and header steps. Typed setters for the variant's
//! own fields live on the concrete builder.

use crate::error::{EnvelopeError, Result};
use crate::headers::Headers;
use crate::message::{Common, MessageBody, Notification, TaggedMessage};
use serde_json::Value;

/// Fields shared by every variant builder.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeParts {
    resource_id: Option<String>,
    headers: Headers,
}

impl EnvelopeParts {
    fn into_message(self, body: MessageBody) -> Result<TaggedMessage> {
        let resource_id = self.resource_id.ok_or(EnvelopeError::MissingResourceId)?;
        Ok(TaggedMessage::from_parts(resource_id, self.headers, body))
    }
}

/// Builder steps shared by all message variants.
pub trait TaggedMessageBuilder: Sized {
    /// Access the shared envelope fields.
    fn parts_mut(&mut self) -> &mut EnvelopeParts;

    /// Finish the message. Fails if the resource id or a variant field is missing.
    fn build(self) -> Result<TaggedMessage>;

    /// Record the resource identifier. Required before [`build`](Self::build).
    fn resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.parts_mut().resource_id = Some(resource_id.into());
        self
    }

    /// Insert or overwrite one header.
    fn add_header(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parts_mut().headers.insert(key, value);
        self
    }

    /// Merge a batch of headers, overwriting colliding keys.
    fn add_headers<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.parts_mut().headers.merge(entries);
        self
    }

    /// Replace all headers collected so far.
    fn headers(mut self, headers: Headers) -> Self {
        self.parts_mut().headers = headers;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct NotificationBuilder {
    parts: EnvelopeParts,
    url: Option<String>,
    action: Option<String>,
}

impl NotificationBuilder {
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

impl TaggedMessageBuilder for NotificationBuilder {
    fn parts_mut(&mut self) -> &mut EnvelopeParts {
        &mut self.parts
    }

    fn build(self) -> Result<TaggedMessage> {
        if self.parts.resource_id.is_none() {
            return Err(EnvelopeError::MissingResourceId);
        }
        let url = self.url.ok_or(EnvelopeError::MissingField("url"))?;
        let action = self.action.ok_or(EnvelopeError::MissingField("action"))?;
        self.parts
            .into_message(MessageBody::Notification(Notification { url, action }))
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommonBuilder {
    parts: EnvelopeParts,
    content: Option<String>,
}

impl CommonBuilder {
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

impl TaggedMessageBuilder for CommonBuilder {
    fn parts_mut(&mut self) -> &mut EnvelopeParts {
        &mut self.parts
    }

    fn build(self) -> Result<TaggedMessage> {
        if self.parts.resource_id.is_none() {
            return Err(EnvelopeError::MissingResourceId);
        }
        let content = self.content.ok_or(EnvelopeError::MissingField("content"))?;
        self.parts
            .into_message(MessageBody::Common(Common { content }))
    }
}
