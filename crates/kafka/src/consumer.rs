use crate::config::{ConsumerConfig, ConversionStrategy};
use crate::conversion::{to_delivery, Delivery, RecordPosition};
use crate::error::{Error, Result};
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer as RdkafkaConsumer, StreamConsumer};
use rdkafka::{Offset, TopicPartitionList};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

const SEEK_TIMEOUT: Duration = Duration::from_secs(5);

/// Kafka consumer that decodes tagged message envelopes and leaves offset
/// commits to the caller.
pub struct Consumer {
    consumer: Arc<StreamConsumer>,
    config: ConsumerConfig,
}

impl Consumer {
    /// Create a new Kafka consumer subscribed to `config.topic`
    pub fn new(config: &ConsumerConfig) -> Result<Self> {
        config.validate()?;

        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", config.enable_auto_commit.to_string())
            .set("auto.offset.reset", &config.auto_offset_reset)
            .set("session.timeout.ms", &config.session_timeout_ms)
            .set("enable.partition.eof", "false")
            .create()
            .map_err(|e| Error::Consumer(format!("Failed to create consumer: {e}")))?;

        consumer
            .subscribe(&[&config.topic])
            .map_err(|e| Error::Consumer(format!("Failed to subscribe to topic: {e}")))?;

        tracing::info!(
            topic = %config.topic,
            group_id = %config.group_id,
            conversion = ?config.conversion,
            ack_mode = ?config.ack_mode,
            "Kafka consumer subscribed"
        );

        Ok(Self {
            consumer: Arc::new(consumer),
            config: config.clone(),
        })
    }

    /// Receive multiple deliveries (blocks until at least one record is available)
    pub async fn receive_batch(&self, max_count: usize) -> Result<Vec<Delivery>> {
        let mut deliveries = Vec::new();

        let msg = self.consumer.recv().await?;
        deliveries.push(to_delivery(&msg, self.conversion())?);

        // Try to fetch more with timeout
        while deliveries.len() < max_count {
            match tokio::time::timeout(Duration::from_millis(10), self.consumer.recv()).await {
                Ok(Ok(msg)) => deliveries.push(to_delivery(&msg, self.conversion())?),
                _ => break,
            }
        }

        Ok(deliveries)
    }

    /// Commit the given positions.
    ///
    /// For every topic-partition the highest offset wins; the committed value
    /// is that offset plus one, i.e. the next record to read.
    pub async fn commit(&self, positions: &[RecordPosition]) -> Result<()> {
        let offsets = next_offsets(positions);
        if offsets.is_empty() {
            return Ok(());
        }

        let mut tpl = TopicPartitionList::new();
        for ((topic, partition), next) in &offsets {
            tpl.add_partition_offset(topic, *partition, Offset::Offset(*next))
                .map_err(|e| Error::Consumer(format!("Failed to add partition offset: {e}")))?;
        }

        self.consumer.commit(&tpl, CommitMode::Sync)?;

        tracing::debug!("Committed offsets: {:?}", offsets);
        Ok(())
    }

    /// Move the fetch position of each given partition back to its offset.
    ///
    /// Records already fetched for those partitions are dropped by librdkafka
    /// and fetched again from the given offset.
    pub fn rewind(&self, positions: &[RecordPosition]) -> Result<()> {
        for position in positions {
            self.consumer.seek(
                &position.topic,
                position.partition,
                Offset::Offset(position.offset),
                SEEK_TIMEOUT,
            )?;
            tracing::warn!(
                topic = %position.topic,
                partition = position.partition,
                offset = position.offset,
                "Rewound partition for redelivery"
            );
        }
        Ok(())
    }

    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    fn conversion(&self) -> ConversionStrategy {
        self.config.conversion
    }

    /// Get the underlying consumer (for advanced use cases)
    pub fn inner(&self) -> &StreamConsumer {
        &self.consumer
    }
}

/// Where the listener loop gets records from and reports progress to.
///
/// [`Consumer`] is the Kafka implementation.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Wait for at least one delivery and return up to `max_count`.
    async fn receive_batch(&self, max_count: usize) -> Result<Vec<Delivery>>;

    /// Commit the given positions (highest offset + 1 per partition).
    async fn commit(&self, positions: &[RecordPosition]) -> Result<()>;

    /// Deliver each given partition again starting at the given offset.
    async fn rewind(&self, positions: &[RecordPosition]) -> Result<()>;
}

#[async_trait]
impl RecordSource for Consumer {
    async fn receive_batch(&self, max_count: usize) -> Result<Vec<Delivery>> {
        Consumer::receive_batch(self, max_count).await
    }

    async fn commit(&self, positions: &[RecordPosition]) -> Result<()> {
        Consumer::commit(self, positions).await
    }

    async fn rewind(&self, positions: &[RecordPosition]) -> Result<()> {
        Consumer::rewind(self, positions)
    }
}

/// Clone support for spawning multiple consumer tasks
impl Clone for Consumer {
    fn clone(&self) -> Self {
        Self {
            consumer: Arc::clone(&self.consumer),
            config: self.config.clone(),
        }
    }
}

/// Reduce positions to the next offset to commit per topic-partition.
pub fn next_offsets(positions: &[RecordPosition]) -> BTreeMap<(String, i32), i64> {
    let mut offsets: BTreeMap<(String, i32), i64> = BTreeMap::new();
    for position in positions {
        let next = position.offset + 1;
        offsets
            .entry((position.topic.clone(), position.partition))
            .and_modify(|current| *current = (*current).max(next))
            .or_insert(next);
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(topic: &str, partition: i32, offset: i64) -> RecordPosition {
        RecordPosition {
            topic: topic.to_string(),
            partition,
            offset,
        }
    }

    #[test]
    fn test_next_offsets_empty() {
        assert!(next_offsets(&[]).is_empty());
    }

    #[test]
    fn test_next_offsets_keeps_highest_per_partition() {
        let offsets = next_offsets(&[
            pos("generic", 0, 5),
            pos("generic", 0, 3),
            pos("generic", 1, 0),
            pos("common", 0, 9),
            pos("generic", 0, 7),
        ]);

        assert_eq!(offsets.len(), 3);
        assert_eq!(offsets[&("generic".to_string(), 0)], 8);
        assert_eq!(offsets[&("generic".to_string(), 1)], 1);
        assert_eq!(offsets[&("common".to_string(), 0)], 10);
    }

    #[test]
    fn test_consumer_rejects_invalid_config() {
        let config = ConsumerConfig::default();
        assert!(matches!(
            Consumer::new(&config),
            Err(Error::InvalidConfig(_))
        ));
    }
}
