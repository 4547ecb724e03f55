use crate::config::{AckMode, ConsumerConfig};
use crate::consumer::{Consumer, RecordSource};
use crate::conversion::{Delivery, RecordPosition};
use crate::error::Result;
use crate::handler::{Acknowledgment, MessageHandler};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Kafka client for managing listener tasks
pub struct Client {
    config: ConsumerConfig,
}

impl Client {
    /// Create a new Kafka client. The config is validated up front.
    pub fn new(config: &ConsumerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
        })
    }

    /// Create a single consumer
    pub fn create_consumer(&self) -> Result<Consumer> {
        Consumer::new(&self.config)
    }

    /// Spawn a listener task that hands every delivery to `handler` and
    /// commits according to the configured [`AckMode`].
    pub fn spawn_listener<H>(&self, handler: Arc<H>) -> Result<JoinHandle<anyhow::Result<()>>>
    where
        H: MessageHandler + 'static,
    {
        let consumer = self.create_consumer()?;
        let batch_size = self.config.batch_size;
        let ack_mode = self.config.ack_mode;

        let handle = tokio::spawn(async move {
            listen(&consumer, handler.as_ref(), batch_size, ack_mode)
                .await
                .map_err(anyhow::Error::from)
        });

        Ok(handle)
    }

    /// Spawn multiple listener tasks in the same consumer group
    ///
    /// When spawning multiple listeners:
    /// - All consumers join the same consumer group (same `group_id`)
    /// - Kafka assigns different partitions of the topic to each consumer
    /// - Each partition is processed by exactly one consumer
    pub fn spawn_listener_group<H>(
        &self,
        num_consumers: usize,
        handler: Arc<H>,
    ) -> Result<Vec<JoinHandle<anyhow::Result<()>>>>
    where
        H: MessageHandler + 'static,
    {
        let mut handles = Vec::new();

        for _ in 0..num_consumers {
            let handle = self.spawn_listener(Arc::clone(&handler))?;
            handles.push(handle);
        }

        Ok(handles)
    }

    /// Get the config
    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }
}

/// Listener loop: receive a batch, hand it to `handler`, commit what may be
/// committed and rewind what must be delivered again.
///
/// Only returns when `source` fails.
pub async fn listen<S, H>(
    source: &S,
    handler: &H,
    batch_size: usize,
    ack_mode: AckMode,
) -> Result<()>
where
    S: RecordSource + ?Sized,
    H: MessageHandler + ?Sized,
{
    loop {
        let deliveries = source.receive_batch(batch_size).await?;
        let outcome = process_batch(handler, deliveries, ack_mode).await;
        source.commit(&outcome.commit).await?;
        source.rewind(&outcome.rewind).await?;
    }
}

/// What to do with a processed batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Positions safe to commit. Per partition this is a gap-free prefix of
    /// the batch, so committing the highest one never skips a record.
    pub commit: Vec<RecordPosition>,
    /// First position per partition that was not committed; the partition
    /// must be fetched again from there.
    pub rewind: Vec<RecordPosition>,
}

/// Run `handler` over a batch in order and decide what gets committed.
///
/// Kafka offsets are cumulative, so within a partition a record can only be
/// committed if every earlier record of the batch was. The first record of a
/// partition that fails (handler error) or is left unacknowledged (under
/// [`AckMode::Manual`]) blocks that partition: later records of it are not
/// handed to the handler, and the partition is rewound to that record.
/// Other partitions carry on.
pub async fn process_batch<H>(
    handler: &H,
    deliveries: Vec<Delivery>,
    ack_mode: AckMode,
) -> BatchOutcome
where
    H: MessageHandler + ?Sized,
{
    let mut outcome = BatchOutcome::default();
    let mut blocked: BTreeSet<(String, i32)> = BTreeSet::new();
    let mut rewind: BTreeMap<(String, i32), i64> = BTreeMap::new();

    for delivery in deliveries {
        let position = delivery.position.clone();
        let partition = (position.topic.clone(), position.partition);
        if blocked.contains(&partition) {
            continue;
        }

        let ack = Acknowledgment::new();
        let committable = match handler.handle(delivery, ack.clone()).await {
            Err(e) => {
                tracing::error!(
                    topic = %position.topic,
                    partition = position.partition,
                    offset = position.offset,
                    "Error handling message: {e:#}"
                );
                false
            }
            Ok(()) => match ack_mode {
                AckMode::Record => true,
                AckMode::Manual => {
                    if !ack.is_acknowledged() {
                        tracing::debug!(offset = position.offset, "Delivery not acknowledged");
                    }
                    ack.is_acknowledged()
                }
            },
        };

        if committable {
            outcome.commit.push(position);
        } else {
            rewind.insert(partition.clone(), position.offset);
            blocked.insert(partition);
        }
    }

    outcome.rewind = rewind
        .into_iter()
        .map(|((topic, partition), offset)| RecordPosition {
            topic,
            partition,
            offset,
        })
        .collect();
    outcome
}
