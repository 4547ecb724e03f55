//! Message handlers invoked by the listener runtime.

use crate::conversion::Delivery;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};

/// Handle used to acknowledge a delivery under [`crate::AckMode::Manual`].
///
/// Under [`crate::AckMode::Record`] acknowledging is harmless and ignored.
#[derive(Debug, Clone, Default)]
pub struct Acknowledgment {
    acked: Arc<AtomicBool>,
}

impl Acknowledgment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the delivery as processed so its offset gets committed.
    pub fn acknowledge(&self) {
        self.acked.store(true, Ordering::SeqCst);
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acked.load(Ordering::SeqCst)
    }
}

/// Application callback for decoded deliveries.
///
/// Returning an error (or, under [`crate::AckMode::Manual`], not
/// acknowledging) leaves the delivery uncommitted. Later deliveries of the
/// same partition in the batch are skipped, and the partition is rewound so
/// the delivery comes back in the next batch. There is no backoff between
/// attempts.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, delivery: Delivery, ack: Acknowledgment) -> anyhow::Result<()>;
}

/// Handler that keeps every delivery it sees and acknowledges it.
///
/// Mostly useful for tests and the CLI `consume` command: callers wait on
/// [`wait_for`](Self::wait_for) like a countdown latch and then inspect
/// [`last_message`](Self::last_message).
#[derive(Debug, Default)]
pub struct RecordingHandler {
    deliveries: Mutex<Vec<Delivery>>,
    notify: Notify,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until at least `count` deliveries have been recorded.
    ///
    /// Returns `false` if the timeout elapsed first.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.notify.notified();
            if self.len().await >= count {
                return true;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.len().await >= count;
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.deliveries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn last_message(&self) -> Option<Delivery> {
        self.deliveries.lock().await.last().cloned()
    }

    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().await.clone()
    }
}

#[async_trait]
impl MessageHandler for RecordingHandler {
    async fn handle(&self, delivery: Delivery, ack: Acknowledgment) -> anyhow::Result<()> {
        tracing::debug!(
            resource_id = %delivery.message.resource_id(),
            offset = delivery.position.offset,
            "Recorded delivery"
        );
        self.deliveries.lock().await.push(delivery);
        ack.acknowledge();
        self.notify.notify_waiters();
        Ok(())
    }
}
