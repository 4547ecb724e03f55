//! Producer and consumer configuration.
//!
//! Both structs are plain values built once at startup (from defaults, a
//! config file, or CLI flags) and handed by reference to the client
//! constructors.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a received Kafka record is turned into a handler-visible [`crate::Delivery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ConversionStrategy {
    /// Decode the record value only.
    ///
    /// The handler sees the decoded envelope (with its in-payload headers) but
    /// not the record key or the Kafka native headers.
    #[default]
    Payload,
    /// Decode the record value and also expose the record key, native headers
    /// and timestamp.
    Messaging,
}

/// When a consumed record's offset is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AckMode {
    /// Commit only records the handler explicitly acknowledged.
    #[default]
    Manual,
    /// Commit every record whose handler returned `Ok`.
    Record,
}

/// Configuration for the envelope consumer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumerConfig {
    /// Kafka brokers (comma-separated list)
    pub brokers: String,
    /// Consumer group ID
    pub group_id: String,
    /// Topic to consume from
    pub topic: String,
    /// Auto offset reset strategy ("earliest" or "latest")
    ///
    /// "earliest" means the consumer will start from the beginning of the topic
    /// if no committed offsets are found for the consumer group.
    pub auto_offset_reset: String,
    /// Session timeout in milliseconds
    pub session_timeout_ms: String,
    /// Enable auto commit (should be false for manual offset management)
    pub enable_auto_commit: bool,
    /// Maximum number of records handed to the listener per batch
    pub batch_size: usize,
    pub conversion: ConversionStrategy,
    pub ack_mode: AckMode,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            group_id: "tagged-messaging-consumer".to_string(),
            topic: "".to_string(),
            auto_offset_reset: "earliest".to_string(),
            session_timeout_ms: "6000".to_string(),
            enable_auto_commit: false,
            batch_size: 100,
            conversion: ConversionStrategy::Payload,
            ack_mode: AckMode::Manual,
        }
    }
}

impl ConsumerConfig {
    /// Listener that only sees decoded payloads and acknowledges manually.
    pub fn payload_listener(brokers: &str, group_id: &str, topic: &str) -> Self {
        Self {
            brokers: brokers.to_string(),
            group_id: group_id.to_string(),
            topic: topic.to_string(),
            conversion: ConversionStrategy::Payload,
            ack_mode: AckMode::Manual,
            ..Default::default()
        }
    }

    /// Listener that sees the full record (key and native headers) and
    /// commits after every successfully handled record.
    pub fn messaging_listener(brokers: &str, group_id: &str, topic: &str) -> Self {
        Self {
            brokers: brokers.to_string(),
            group_id: group_id.to_string(),
            topic: topic.to_string(),
            conversion: ConversionStrategy::Messaging,
            ack_mode: AckMode::Record,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.brokers.trim().is_empty() {
            return Err(Error::InvalidConfig("brokers must not be empty".to_string()));
        }
        if self.group_id.trim().is_empty() {
            return Err(Error::InvalidConfig("group_id must not be empty".to_string()));
        }
        if self.topic.trim().is_empty() {
            return Err(Error::InvalidConfig("topic must not be empty".to_string()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the envelope producer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProducerConfig {
    /// Kafka brokers (comma-separated list)
    pub brokers: String,
    /// librdkafka `message.timeout.ms`
    pub message_timeout_ms: String,
    /// How long `send` waits for queue space, in milliseconds
    pub send_timeout_ms: u64,
    /// Also copy the envelope headers into Kafka native record headers.
    ///
    /// The in-payload headers are always written; this only adds a second copy
    /// for consumers that read native headers.
    pub mirror_native_headers: bool,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            message_timeout_ms: "5000".to_string(),
            send_timeout_ms: 5000,
            mirror_native_headers: false,
        }
    }
}

impl ProducerConfig {
    pub fn new(brokers: &str) -> Self {
        Self {
            brokers: brokers.to_string(),
            ..Default::default()
        }
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.brokers.trim().is_empty() {
            return Err(Error::InvalidConfig("brokers must not be empty".to_string()));
        }
        Ok(())
    }
}
