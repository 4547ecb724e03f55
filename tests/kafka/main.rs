//! Kafka E2E tests
//!
//! Publish tagged messages to a real broker and check what listeners receive.
//! These need a broker at `KAFKA_BROKERS` (default `kafka:9092`) and are
//! ignored by default; run them with `cargo test --test kafka -- --ignored`.

mod headers_roundtrip;
