//! Tagged Messaging Library
//!
//! Kafka producer/consumer wiring for [`envelope_types::TaggedMessage`]
//! envelopes whose headers travel inside the JSON payload.
//!
//! # Crates
//!
//! - `envelope_types` - the envelope, its headers, builders and JSON codec
//! - `tagged_messaging_kafka` - producer, manual-ack consumer, conversion
//!   strategies and listener runtime
//!
//! # CLI Usage
//!
//! ```bash
//! # Publish a notification with two in-payload headers
//! tagged-messaging produce notification --topic generic-messages \
//!   --resource-id 1 --url http://example.com/endpoint --action create \
//!   --header my_header1="value 1" --header my_header2="value 2"
//!
//! # Consume with the full-record conversion strategy
//! tagged-messaging consume --topic generic-messages --strategy messaging --max-messages 1
//! ```

use clap::Parser;
use std::path::PathBuf;

pub mod commands;
pub mod config;
pub mod testing;

pub use config::MessagingConfig;

#[derive(Parser, Clone, Debug, Default)]
pub struct BrokerOpts {
    /// Kafka brokers (comma-separated), overrides the config file
    #[arg(long, env = "KAFKA_BROKERS")]
    pub brokers: Option<String>,

    /// Path to a TOML configuration file
    #[arg(long, env = "MESSAGING_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl BrokerOpts {
    /// Load the config file (or defaults) and apply the broker override.
    pub fn load(&self) -> anyhow::Result<MessagingConfig> {
        let config = match &self.config {
            Some(path) => MessagingConfig::from_file(path)?,
            None => MessagingConfig::default(),
        };

        Ok(match &self.brokers {
            Some(brokers) => config.with_brokers(brokers),
            None => config,
        })
    }
}
