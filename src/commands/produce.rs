//! `produce` subcommand.

use anyhow::Context;
use clap::{Args, Subcommand};
use envelope_types::{TaggedMessage, TaggedMessageBuilder};
use serde_json::Value;
use tagged_messaging_kafka::EnvelopeProducer;

use crate::BrokerOpts;

/// Arguments shared by every message variant.
#[derive(Args, Clone, Debug)]
pub struct ProduceArgs {
    #[command(flatten)]
    pub broker: BrokerOpts,

    /// Topic to publish to
    #[arg(long)]
    pub topic: String,

    /// Identifier of the resource the message is about (also the record key)
    #[arg(long)]
    pub resource_id: String,

    /// In-payload header, repeatable. Values are parsed as JSON when valid,
    /// otherwise kept as strings.
    #[arg(long = "header", value_name = "KEY=VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, Value)>,

    /// Also copy the headers into Kafka native record headers
    #[arg(long)]
    pub mirror_native_headers: bool,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ProduceMessage {
    /// Publish a notification message
    Notification {
        #[command(flatten)]
        args: ProduceArgs,

        /// Endpoint the notification refers to
        #[arg(long)]
        url: String,

        /// Action performed (e.g. "create")
        #[arg(long)]
        action: String,
    },

    /// Publish a common message
    Common {
        #[command(flatten)]
        args: ProduceArgs,

        /// Message content
        #[arg(long)]
        content: String,
    },
}

impl ProduceMessage {
    /// Split into the shared arguments and the built message.
    pub fn into_message(self) -> anyhow::Result<(ProduceArgs, TaggedMessage)> {
        match self {
            ProduceMessage::Notification { args, url, action } => {
                let message = TaggedMessage::notification()
                    .url(url)
                    .action(action)
                    .resource_id(args.resource_id.clone())
                    .add_headers(args.headers.clone())
                    .build()?;
                Ok((args, message))
            }
            ProduceMessage::Common { args, content } => {
                let message = TaggedMessage::common()
                    .content(content)
                    .resource_id(args.resource_id.clone())
                    .add_headers(args.headers.clone())
                    .build()?;
                Ok((args, message))
            }
        }
    }
}

/// Parse a `KEY=VALUE` header argument.
pub fn parse_header(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid header '{s}': expected KEY=VALUE"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid header '{s}': empty key"));
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

pub async fn run(message: ProduceMessage) -> anyhow::Result<()> {
    let (args, message) = message.into_message()?;

    let mut config = args.broker.load()?;
    config.producer.mirror_native_headers |= args.mirror_native_headers;

    let producer =
        EnvelopeProducer::new(&config.producer).context("Failed to create Kafka producer")?;

    tracing::info!(
        "Publishing {} message for resource '{}' to topic '{}'",
        message.kind(),
        message.resource_id(),
        args.topic
    );

    let report = producer
        .send(&args.topic, &message)
        .await
        .with_context(|| format!("Failed to publish message to '{}'", args.topic))?;

    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
