//! `consume` subcommand.
//!
//! Runs a group of listeners and prints every delivery as one JSON line on
//! stdout until enough messages were seen or the timeout elapses.

use crate::config::parse_duration;
use crate::BrokerOpts;
use anyhow::Context;
use async_trait::async_trait;
use clap::Args;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tagged_messaging_kafka::{
    AckMode, Acknowledgment, Client, ConsumerConfig, ConversionStrategy, Delivery, MessageHandler,
};
use tracing::{error, info};

#[derive(Args, Clone, Debug)]
pub struct ConsumeArgs {
    #[command(flatten)]
    pub broker: BrokerOpts,

    /// Topic to consume from
    #[arg(long)]
    pub topic: String,

    /// Consumer group ID, overrides the config file
    #[arg(long)]
    pub group_id: Option<String>,

    /// How records are turned into deliveries
    #[arg(long, value_enum)]
    pub strategy: Option<ConversionStrategy>,

    /// When offsets are committed
    #[arg(long, value_enum)]
    pub ack_mode: Option<AckMode>,

    /// Number of consumers in the group
    #[arg(long, default_value = "1")]
    pub num_consumers: usize,

    /// Stop after this many messages
    #[arg(long)]
    pub max_messages: Option<u64>,

    /// Stop after this long (e.g. "30s", "5m")
    #[arg(long, default_value = "30s")]
    pub timeout: String,
}

impl ConsumeArgs {
    /// Apply the command line on top of the configured consumer settings.
    pub fn consumer_config(&self, base: ConsumerConfig) -> ConsumerConfig {
        ConsumerConfig {
            topic: self.topic.clone(),
            group_id: self.group_id.clone().unwrap_or(base.group_id.clone()),
            conversion: self.strategy.unwrap_or(base.conversion),
            ack_mode: self.ack_mode.unwrap_or(base.ack_mode),
            ..base
        }
    }
}

/// Prints each delivery as a JSON line and acknowledges it.
#[derive(Debug, Default)]
pub struct JsonLinesHandler {
    count: AtomicU64,
}

impl JsonLinesHandler {
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageHandler for JsonLinesHandler {
    async fn handle(&self, delivery: Delivery, ack: Acknowledgment) -> anyhow::Result<()> {
        let line = serde_json::to_string(&delivery).context("Failed to render delivery")?;
        println!("{line}");
        ack.acknowledge();

        let count = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        if count % 100 == 0 {
            info!("Processed {count} messages total");
        }
        Ok(())
    }
}

fn deadline_after(timeout: Duration) -> anyhow::Result<tokio::time::Instant> {
    tokio::time::Instant::now()
        .checked_add(timeout)
        .with_context(|| format!("Timeout too large: {timeout:?}"))
}

pub async fn run(args: ConsumeArgs) -> anyhow::Result<()> {
    let timeout = parse_duration(&args.timeout)?;
    let config = args.consumer_config(args.broker.load()?.consumer);

    info!(
        "Consuming from topic {} as group {} ({:?}, {:?} ack)",
        config.topic, config.group_id, config.conversion, config.ack_mode
    );

    let client = Client::new(&config)?;
    let handler = Arc::new(JsonLinesHandler::default());
    let handles = client.spawn_listener_group(args.num_consumers, Arc::clone(&handler))?;

    let deadline = deadline_after(timeout)?;
    let result = loop {
        if args.max_messages.is_some_and(|max| handler.count() >= max) {
            break Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            info!("Timeout reached after {} messages", handler.count());
            break Ok(());
        }
        if let Some(finished) = handles.iter().position(|h| h.is_finished()) {
            break Err(finished);
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    };

    match result {
        Ok(()) => {
            for handle in &handles {
                handle.abort();
            }
            info!("Consumed {} messages", handler.count());
            Ok(())
        }
        Err(i) => {
            let mut handles = handles;
            let handle = handles.remove(i);
            for other in &handles {
                other.abort();
            }
            match handle.await {
                Ok(Ok(())) => anyhow::bail!("Consumer {i} stopped unexpectedly"),
                Ok(Err(e)) => {
                    error!("Consumer {i} error: {e:#}");
                    Err(e.context(format!("Consumer {i} failed")))
                }
                Err(e) => Err(anyhow::anyhow!("Consumer {i} task error: {e}")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ConsumeArgs {
        ConsumeArgs {
            broker: BrokerOpts::default(),
            topic: "generic-messages".to_string(),
            group_id: None,
            strategy: None,
            ack_mode: None,
            num_consumers: 1,
            max_messages: Some(1),
            timeout: "30s".to_string(),
        }
    }

    #[test]
    fn test_deadline_after_rejects_huge_timeout() {
        assert!(deadline_after(Duration::from_secs(30)).is_ok());
        assert!(deadline_after(Duration::MAX).is_err());
        assert!(deadline_after(Duration::from_secs(u64::MAX)).is_err());
    }

    #[test]
    fn test_consumer_config_keeps_configured_defaults() {
        let base = ConsumerConfig {
            brokers: "kafka:9092".to_string(),
            group_id: "from-file".to_string(),
            ack_mode: AckMode::Record,
            ..Default::default()
        };

        let config = args().consumer_config(base);
        assert_eq!(config.topic, "generic-messages");
        assert_eq!(config.brokers, "kafka:9092");
        assert_eq!(config.group_id, "from-file");
        assert_eq!(config.conversion, ConversionStrategy::Payload);
        assert_eq!(config.ack_mode, AckMode::Record);
    }

    #[test]
    fn test_consumer_config_flags_override() {
        let args = ConsumeArgs {
            group_id: Some("cli-group".to_string()),
            strategy: Some(ConversionStrategy::Messaging),
            ack_mode: Some(AckMode::Manual),
            ..args()
        };

        let config = args.consumer_config(ConsumerConfig::default());
        assert_eq!(config.group_id, "cli-group");
        assert_eq!(config.conversion, ConversionStrategy::Messaging);
        assert_eq!(config.ack_mode, AckMode::Manual);
        assert!(config.validate().is_ok());
    }
}
