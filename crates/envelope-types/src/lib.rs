//! Tagged message envelope for tagged-messaging.
//!
//! A [`TaggedMessage`] carries a resource identifier, an open-ended header map
//! and a variant body. The headers travel inside the JSON payload rather than
//! in Kafka's native header channel, so they reach the handler no matter which
//! conversion strategy the consuming side uses.
//!
//! # Wire shape
//!
//! ```text
//! {
//!   "resource_id": "1",
//!   "headers": { "my_header1": "value 1" },   // omitted when empty
//!   "type": "notification",
//!   "url": "http://example.com/endpoint",
//!   "action": "create"
//! }
//! ```
//!
//! # Modules
//!
//! - [`headers`] - the header map and its merge semantics
//! - [`message`] - [`TaggedMessage`] and the [`MessageBody`] variants
//! - [`builder`] - per-variant builders sharing the [`TaggedMessageBuilder`] trait
//! - [`codec`] - JSON encoding and decoding
//! - [`error`] - error types
//!
//! # Example
//!
//! ```rust
//! use envelope_types::{codec, TaggedMessage, TaggedMessageBuilder};
//!
//! let message = TaggedMessage::notification()
//!     .url("http://example.com/endpoint")
//!     .action("create")
//!     .resource_id("1")
//!     .add_header("my_header1", "value 1")
//!     .build()?;
//!
//! let bytes = codec::encode(&message)?;
//! assert_eq!(codec::decode(&bytes)?, message);
//! # Ok::<(), envelope_types::EnvelopeError>(())
//! ```

pub mod builder;
pub mod codec;
pub mod error;
pub mod headers;
pub mod message;

// Re-export main types for convenient access
pub use builder::{CommonBuilder, NotificationBuilder, TaggedMessageBuilder};
pub use error::{EnvelopeError, Result};
pub use headers::Headers;
pub use message::{Common, MessageBody, Notification, TaggedMessage};
