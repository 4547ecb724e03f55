//! Kafka transport for tagged message envelopes.
//!
//! Features:
//!
//! - Envelope Producer: JSON-encode [`TaggedMessage`]s, key them by resource id,
//!   optionally mirror their headers into Kafka native headers
//! - Conversion Strategies: value-only decoding, or full-record decoding that
//!   also exposes the record key and native headers
//! - Manual Acknowledgment: offsets are committed only for acknowledged records;
//!   a failed or unacknowledged record rewinds its partition for redelivery
//! - Consumer Groups: Spawn multiple listeners in the same consumer group

/// High-level API for spawning listener tasks
///
/// Takes the consumer config to create one or more consumers in the same
/// consumer group, each running in its own async task.
pub mod client;
pub mod config;

/// Low-level consumer with manual offsets
pub mod consumer;
pub mod conversion;
pub mod error;
pub mod handler;
pub mod producer;

// Re-export main types for easy access
pub use client::{listen, process_batch, BatchOutcome, Client};
pub use config::{AckMode, ConsumerConfig, ConversionStrategy, ProducerConfig};
pub use consumer::{Consumer, RecordSource};
pub use conversion::{to_delivery, Delivery, RecordContext, RecordPosition};
pub use envelope_types::{Headers, TaggedMessage, TaggedMessageBuilder};
pub use error::{Error, Result};
pub use handler::{Acknowledgment, MessageHandler, RecordingHandler};
pub use producer::{DeliveryReport, EnvelopeProducer};
