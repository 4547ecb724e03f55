//! Header propagation E2E test
//!
//! Test flow:
//! 1. Create a unique topic
//! 2. Publish a notification for resource "1" carrying `my_header1` and
//!    `my_header2` in its payload
//! 3. Consume it with a listener using the given conversion strategy
//! 4. Verify the received envelope, including both headers

use std::sync::Arc;
use std::time::Duration;
use tagged_messaging::testing::{
    sample_common, sample_notification, test_brokers, unique_topic_and_group,
};
use tagged_messaging_kafka::{
    Client, ConsumerConfig, EnvelopeProducer, ProducerConfig, RecordingHandler,
};
use tokio::time::sleep;

const RECEIVE_TIMEOUT: Duration = Duration::from_secs(30);

async fn producer_with_topic(
    topic: &str,
    mirror_native_headers: bool,
) -> anyhow::Result<EnvelopeProducer> {
    let config = ProducerConfig {
        mirror_native_headers,
        ..ProducerConfig::new(&test_brokers())
    };
    let producer = EnvelopeProducer::new(&config)?;
    producer.create_topic_if_not_exists(topic, 1).await?;

    // Give Kafka a moment to propagate topic metadata
    sleep(Duration::from_millis(500)).await;
    Ok(producer)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("tagged_messaging=debug,tagged_messaging_kafka=debug")
        .try_init()
        .ok();
}

#[tokio::test]
#[ignore = "requires a Kafka broker"]
async fn test_headers_survive_payload_strategy() -> anyhow::Result<()> {
    init_tracing();

    let (topic, group) = unique_topic_and_group("tagged-payload");
    let producer = producer_with_topic(&topic, false).await?;

    let sent = sample_notification()?;
    let report = producer.send(&topic, &sent).await?;
    assert_eq!(report.topic, topic);

    let handler = Arc::new(RecordingHandler::new());
    let client = Client::new(&ConsumerConfig::payload_listener(
        &test_brokers(),
        &group,
        &topic,
    ))?;
    let handle = client.spawn_listener(Arc::clone(&handler))?;

    assert!(
        handler.wait_for(1, RECEIVE_TIMEOUT).await,
        "no message received from {topic}"
    );
    handle.abort();

    let delivery = handler.last_message().await.expect("recorded delivery");
    let received = delivery.message;
    assert_eq!(received.resource_id(), "1");
    assert_eq!(received.headers().get_str("my_header1"), Some("value 1"));
    assert_eq!(received.headers().get_str("my_header2"), Some("value 2"));
    assert_eq!(received, sent);
    // Payload strategy hides the record itself
    assert!(delivery.record.is_none());
    assert_eq!(delivery.position.offset, report.offset);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a Kafka broker"]
async fn test_headers_survive_messaging_strategy() -> anyhow::Result<()> {
    init_tracing();

    let (topic, group) = unique_topic_and_group("tagged-messaging");
    let producer = producer_with_topic(&topic, true).await?;

    let sent = sample_notification()?;
    producer.send(&topic, &sent).await?;

    let handler = Arc::new(RecordingHandler::new());
    let client = Client::new(&ConsumerConfig::messaging_listener(
        &test_brokers(),
        &group,
        &topic,
    ))?;
    let handle = client.spawn_listener(Arc::clone(&handler))?;

    assert!(
        handler.wait_for(1, RECEIVE_TIMEOUT).await,
        "no message received from {topic}"
    );
    handle.abort();

    let delivery = handler.last_message().await.expect("recorded delivery");
    assert_eq!(delivery.message, sent);
    assert_eq!(delivery.key(), Some("1"));
    assert_eq!(delivery.native_header("my_header1"), Some("value 1"));
    assert_eq!(delivery.native_header("my_header2"), Some("value 2"));

    Ok(())
}

#[tokio::test]
#[ignore = "requires a Kafka broker"]
async fn test_same_resource_keeps_order() -> anyhow::Result<()> {
    init_tracing();

    let (topic, group) = unique_topic_and_group("tagged-order");
    let producer = producer_with_topic(&topic, false).await?;

    for i in 0..5 {
        producer
            .send(&topic, &sample_common("42", &format!("message {i}"))?)
            .await?;
    }

    let handler = Arc::new(RecordingHandler::new());
    let client = Client::new(&ConsumerConfig::payload_listener(
        &test_brokers(),
        &group,
        &topic,
    ))?;
    let handle = client.spawn_listener(Arc::clone(&handler))?;

    assert!(handler.wait_for(5, RECEIVE_TIMEOUT).await);
    handle.abort();

    let contents: Vec<String> = handler
        .deliveries()
        .await
        .iter()
        .filter_map(|d| d.message.as_common().map(|c| c.content.clone()))
        .collect();
    let expected: Vec<String> = (0..5).map(|i| format!("message {i}")).collect();
    assert_eq!(contents, expected);

    Ok(())
}
