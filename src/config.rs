//! Application configuration.
//!
//! [`MessagingConfig`] is loaded once at startup (TOML file, then CLI/env
//! overrides) and passed by reference to the producer and consumer
//! constructors.
//!
//! ```toml
//! [consumer]
//! brokers = "localhost:9092"
//! group_id = "generic-consumer"
//! topic = "generic-messages"
//! conversion = "messaging"
//! ack_mode = "record"
//!
//! [producer]
//! brokers = "localhost:9092"
//! mirror_native_headers = true
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use tagged_messaging_kafka::{ConsumerConfig, ProducerConfig};

pub mod duration;

pub use duration::parse_duration;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    pub consumer: ConsumerConfig,
    pub producer: ProducerConfig,
}

impl MessagingConfig {
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("Failed to parse messaging config")
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path:?}"))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config file {path:?}"))
    }

    /// Point both the producer and the consumer at `brokers`.
    pub fn with_brokers(mut self, brokers: &str) -> Self {
        self.consumer.brokers = brokers.to_string();
        self.producer.brokers = brokers.to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagged_messaging_kafka::{AckMode, ConversionStrategy};

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = MessagingConfig::from_toml_str("").unwrap();
        assert_eq!(config, MessagingConfig::default());
        assert_eq!(config.consumer.brokers, "localhost:9092");
        assert!(!config.consumer.enable_auto_commit);
    }

    #[test]
    fn test_sections_override_defaults() {
        let config = MessagingConfig::from_toml_str(
            r#"
            [consumer]
            group_id = "generic-consumer"
            topic = "generic-messages"
            conversion = "messaging"
            ack_mode = "record"
            batch_size = 10

            [producer]
            mirror_native_headers = true
            send_timeout_ms = 1000
            "#,
        )
        .unwrap();

        assert_eq!(config.consumer.group_id, "generic-consumer");
        assert_eq!(config.consumer.topic, "generic-messages");
        assert_eq!(config.consumer.conversion, ConversionStrategy::Messaging);
        assert_eq!(config.consumer.ack_mode, AckMode::Record);
        assert_eq!(config.consumer.batch_size, 10);
        assert_eq!(config.consumer.session_timeout_ms, "6000");
        assert!(config.producer.mirror_native_headers);
        assert_eq!(config.producer.send_timeout_ms, 1000);
    }

    #[test]
    fn test_with_brokers_overrides_both_sides() {
        let config = MessagingConfig::default().with_brokers("kafka:9092");
        assert_eq!(config.consumer.brokers, "kafka:9092");
        assert_eq!(config.producer.brokers, "kafka:9092");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let result = MessagingConfig::from_toml_str(
            r#"
            [consumer]
            ack_mode = "sometimes"
            "#,
        );
        assert!(result.is_err());
    }
}
