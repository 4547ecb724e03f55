//! Conversion of raw Kafka records into handler-visible deliveries.
//!
//! The record value is always decoded as a full [`TaggedMessage`], so the
//! in-payload headers survive under both strategies. Only
//! [`ConversionStrategy::Messaging`] additionally exposes the record key and
//! Kafka native headers.

use crate::config::ConversionStrategy;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use envelope_types::{codec, TaggedMessage};
use rdkafka::message::{Headers as _, Message as RdkafkaMessage};
use serde::Serialize;
use std::collections::BTreeMap;

/// Where a record lives in the log. Used for committing offsets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RecordPosition {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

/// Record-level data outside the payload body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordContext {
    /// Record key, decoded as UTF-8 (lossy)
    pub key: Option<String>,
    /// Kafka native headers, values decoded as UTF-8 (lossy); null values are skipped
    pub native_headers: BTreeMap<String, String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// A decoded record as seen by a [`crate::MessageHandler`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delivery {
    pub message: TaggedMessage,
    pub position: RecordPosition,
    /// Present only with [`ConversionStrategy::Messaging`]
    pub record: Option<RecordContext>,
}

impl Delivery {
    pub fn key(&self) -> Option<&str> {
        self.record.as_ref().and_then(|r| r.key.as_deref())
    }

    pub fn native_header(&self, name: &str) -> Option<&str> {
        self.record
            .as_ref()
            .and_then(|r| r.native_headers.get(name))
            .map(String::as_str)
    }
}

/// Convert a raw Kafka record into a [`Delivery`] using the given strategy.
pub fn to_delivery<M: RdkafkaMessage>(msg: &M, strategy: ConversionStrategy) -> Result<Delivery> {
    let position = RecordPosition {
        topic: msg.topic().to_string(),
        partition: msg.partition(),
        offset: msg.offset(),
    };

    let payload = msg.payload().ok_or_else(|| {
        Error::Consumer(format!(
            "Record {}/{}@{} has no payload",
            position.topic, position.partition, position.offset
        ))
    })?;

    let message = codec::decode(payload).map_err(|source| Error::Decode {
        topic: position.topic.clone(),
        partition: position.partition,
        offset: position.offset,
        source,
    })?;

    let record = match strategy {
        ConversionStrategy::Payload => None,
        ConversionStrategy::Messaging => Some(record_context(msg)),
    };

    Ok(Delivery {
        message,
        position,
        record,
    })
}

fn record_context<M: RdkafkaMessage>(msg: &M) -> RecordContext {
    let mut native_headers = BTreeMap::new();
    if let Some(headers) = msg.headers() {
        for header in headers.iter() {
            if let Some(value) = header.value {
                native_headers.insert(
                    header.key.to_string(),
                    String::from_utf8_lossy(value).into_owned(),
                );
            }
        }
    }

    RecordContext {
        key: msg.key().map(|k| String::from_utf8_lossy(k).into_owned()),
        native_headers,
        timestamp: msg
            .timestamp()
            .to_millis()
            .and_then(DateTime::from_timestamp_millis),
    }
}
