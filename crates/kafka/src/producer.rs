//! Kafka producer for tagged message envelopes.
//!
//! Messages are encoded as JSON with their headers inside the payload and
//! keyed by resource id, so all messages about one resource land on the same
//! partition. Optionally the headers are mirrored into Kafka native headers.

use crate::config::ProducerConfig;
use crate::error::{Error, Result};
use envelope_types::{codec, Headers, TaggedMessage};
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Where a sent message ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

/// Kafka producer wrapper for tagged messages
pub struct EnvelopeProducer {
    producer: FutureProducer,
    config: ProducerConfig,
}

impl EnvelopeProducer {
    /// Create a new producer from an explicit configuration
    pub fn new(config: &ProducerConfig) -> Result<Self> {
        config.validate()?;

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("message.timeout.ms", &config.message_timeout_ms)
            .create()
            .map_err(|e| Error::Producer(format!("Failed to create Kafka producer: {e}")))?;

        Ok(Self {
            producer,
            config: config.clone(),
        })
    }

    /// Publish a message to `topic`
    pub async fn send(&self, topic: &str, message: &TaggedMessage) -> Result<DeliveryReport> {
        let payload = codec::encode(message)?;
        let key = message.resource_id();

        let mut record = FutureRecord::to(topic).key(key).payload(&payload);
        if self.config.mirror_native_headers && !message.headers().is_empty() {
            record = record.headers(native_headers(message.headers()));
        }

        let (partition, offset) = self
            .producer
            .send(record, self.config.send_timeout())
            .await
            .map_err(|(err, _)| Error::Producer(format!("Failed to send message to Kafka: {err}")))?;

        tracing::debug!(
            "Published {} message for resource {} to {}/{}@{}",
            message.kind(),
            key,
            topic,
            partition,
            offset
        );

        Ok(DeliveryReport {
            topic: topic.to_string(),
            partition,
            offset,
        })
    }

    /// Create Kafka topic if it doesn't exist
    pub async fn create_topic_if_not_exists(&self, topic: &str, partitions: i32) -> Result<()> {
        let admin_client: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", &self.config.brokers)
            .create()
            .map_err(|e| Error::TopicCreation(format!("Failed to create admin client: {e}")))?;

        let new_topic = NewTopic::new(topic, partitions, TopicReplication::Fixed(1));
        let opts = AdminOptions::new().operation_timeout(Some(Duration::from_secs(5)));

        let results = admin_client
            .create_topics(&[new_topic], &opts)
            .await
            .map_err(|e| Error::TopicCreation(format!("Failed to create topics: {e}")))?;

        for result in results {
            match result {
                Ok(topic_name) => {
                    tracing::info!("Topic '{topic_name}' created successfully");
                }
                Err((topic_name, err)) => {
                    if err.to_string().contains("already exists") {
                        tracing::info!("Topic '{topic_name}' already exists");
                    } else {
                        return Err(Error::TopicCreation(format!(
                            "Failed to create topic '{topic_name}': {err}"
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    pub fn config(&self) -> &ProducerConfig {
        &self.config
    }
}

/// Copy envelope headers into Kafka native headers.
pub fn native_headers(headers: &Headers) -> OwnedHeaders {
    let mut native = OwnedHeaders::new_with_capacity(headers.len());
    for (key, value) in headers {
        let bytes = native_header_value(value);
        native = native.insert(Header {
            key: key.as_str(),
            value: Some(bytes.as_slice()),
        });
    }
    native
}

/// Strings are written as-is, everything else as JSON text.
fn native_header_value(value: &Value) -> Vec<u8> {
    match value {
        Value::String(s) => s.as_bytes().to_vec(),
        other => other.to_string().into_bytes(),
    }
}
