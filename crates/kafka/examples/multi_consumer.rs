use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tagged_messaging_kafka::{Acknowledgment, Client, ConsumerConfig, Delivery, MessageHandler};

/// Example demonstrating multiple listeners in a consumer group
///
/// This example shows how to:
/// 1. Configure a full-record ("messaging") listener
/// 2. Create a Kafka client
/// 3. Spawn multiple listeners in the same consumer group
/// 4. Read in-payload headers next to the native record headers
/// 5. Acknowledge deliveries so their offsets get committed
///
/// To run this example:
/// 1. Start Kafka with Docker
///   docker run -d --name kafka -p 9092:9092 apache/kafka:latest
/// 2. Publish a few messages
///   cargo run -- produce notification --topic generic-messages --resource-id 1 \
///     --url http://example.com/endpoint --action create --header my_header1="value 1"
/// 3. Run this example
///   cargo run -p tagged-messaging-kafka --example multi_consumer

struct PrintingHandler {
    processed: AtomicU64,
}

#[async_trait]
impl MessageHandler for PrintingHandler {
    async fn handle(&self, delivery: Delivery, ack: Acknowledgment) -> anyhow::Result<()> {
        println!(
            "[Partition {}] {} resource={} headers={:?} key={:?} native_headers={:?}",
            delivery.position.partition,
            delivery.message.kind(),
            delivery.message.resource_id(),
            delivery.message.headers(),
            delivery.key(),
            delivery.record.as_ref().map(|r| &r.native_headers),
        );
        ack.acknowledge();

        let count = self.processed.fetch_add(1, Ordering::SeqCst) + 1;
        if count % 100 == 0 {
            println!("Processed {count} messages total");
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    match run_main().await {
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {e:?}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<()> {
    let config = ConsumerConfig {
        batch_size: 10,
        ..ConsumerConfig::messaging_listener(
            "localhost:9092",
            "multi-consumer-example-group",
            "generic-messages",
        )
    };

    let client = Client::new(&config)?;
    println!("Kafka client created successfully");

    let handler = Arc::new(PrintingHandler {
        processed: AtomicU64::new(0),
    });

    // Spawn 3 listeners in the same consumer group
    // Each listener will process different partitions
    println!("Spawning 3 listeners in the same consumer group...");
    let handles = client.spawn_listener_group(3, handler)?;

    println!("Listeners running. Press Ctrl+C to stop.");

    // Wait for all listeners (runs indefinitely until Ctrl+C)
    for (i, handle) in handles.into_iter().enumerate() {
        match handle.await {
            Ok(Ok(())) => println!("Listener {i} finished successfully"),
            Ok(Err(e)) => eprintln!("Listener {i} error: {e}"),
            Err(e) => eprintln!("Listener {i} task error: {e}"),
        }
    }

    Ok(())
}
