//! Command-line interface for tagged-messaging
//!
//! # Usage Examples
//!
//! ## Topics
//! ```bash
//! tagged-messaging create-topic --topic generic-messages --partitions 3
//! ```
//!
//! ## Producing
//! ```bash
//! # Notification with two in-payload headers
//! tagged-messaging produce notification \
//!   --topic generic-messages --resource-id 1 \
//!   --url http://example.com/endpoint --action create \
//!   --header my_header1="value 1" --header my_header2="value 2"
//!
//! # Common message, headers also mirrored into Kafka native headers
//! tagged-messaging produce common \
//!   --topic generic-messages --resource-id 2 --content hello \
//!   --header attempt=3 --mirror-native-headers
//! ```
//!
//! ## Consuming
//! ```bash
//! # Payload-only conversion, manual acknowledgment
//! tagged-messaging consume --topic generic-messages --max-messages 10
//!
//! # Full-record conversion, commit after every record
//! tagged-messaging consume --topic generic-messages \
//!   --strategy messaging --ack-mode record --timeout 1m
//! ```
//!
//! Brokers default to `localhost:9092` and can be set with `--brokers`,
//! `KAFKA_BROKERS`, or a TOML file passed via `--config` / `MESSAGING_CONFIG`.

use clap::{Parser, Subcommand};
use tagged_messaging::commands::{self, ConsumeArgs, CreateTopicArgs, ProduceMessage};

#[derive(Parser)]
#[command(name = "tagged-messaging")]
#[command(about = "Publish and consume tagged message envelopes over Kafka")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish one message
    Produce {
        #[command(subcommand)]
        message: ProduceMessage,
    },

    /// Consume messages and print them as JSON lines
    Consume {
        #[command(flatten)]
        args: ConsumeArgs,
    },

    /// Create a topic if it does not exist yet
    CreateTopic {
        #[command(flatten)]
        args: CreateTopicArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Produce { message } => commands::produce::run(message).await,
        Commands::Consume { args } => commands::consume::run(args).await,
        Commands::CreateTopic { args } => commands::topic::run(args).await,
    }
}
