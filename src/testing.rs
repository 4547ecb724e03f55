//! Helpers shared by the integration tests.
//!
//! Broker-backed tests read `KAFKA_BROKERS` (default `kafka:9092`, the
//! devcontainer hostname) and use unique topic and group names per run so
//! they can share a broker.

use envelope_types::{TaggedMessage, TaggedMessageBuilder};
use std::sync::atomic::{AtomicU64, Ordering};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique test ID to prevent conflicts between concurrent tests
pub fn generate_test_id() -> u64 {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    timestamp.wrapping_add(counter)
}

pub fn test_brokers() -> String {
    std::env::var("KAFKA_BROKERS").unwrap_or_else(|_| "kafka:9092".to_string())
}

/// `(topic, group_id)` pair unique to one test run.
pub fn unique_topic_and_group(prefix: &str) -> (String, String) {
    let id = generate_test_id();
    (format!("{prefix}-{id}"), format!("{prefix}-group-{id}"))
}

/// The notification used throughout the header propagation tests:
/// resource `1` with `my_header1` and `my_header2` set.
pub fn sample_notification() -> anyhow::Result<TaggedMessage> {
    Ok(TaggedMessage::notification()
        .url("http://example.com/endpoint")
        .action("create")
        .resource_id("1")
        .add_header("my_header1", "value 1")
        .add_header("my_header2", "value 2")
        .build()?)
}

pub fn sample_common(resource_id: &str, content: &str) -> anyhow::Result<TaggedMessage> {
    Ok(TaggedMessage::common()
        .content(content)
        .resource_id(resource_id)
        .build()?)
}
