use anyhow::Context;
use clap::Args;
use tagged_messaging_kafka::EnvelopeProducer;

use crate::BrokerOpts;

#[derive(Args, Clone, Debug)]
pub struct CreateTopicArgs {
    #[command(flatten)]
    pub broker: BrokerOpts,

    /// Topic to create
    #[arg(long)]
    pub topic: String,

    /// Number of partitions
    #[arg(long, default_value = "3")]
    pub partitions: i32,
}

pub async fn run(args: CreateTopicArgs) -> anyhow::Result<()> {
    let config = args.broker.load()?;
    let producer =
        EnvelopeProducer::new(&config.producer).context("Failed to create Kafka producer")?;

    producer
        .create_topic_if_not_exists(&args.topic, args.partitions)
        .await
        .with_context(|| format!("Failed to create topic '{}'", args.topic))?;

    Ok(())
}
