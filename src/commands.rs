//! Subcommand handlers for the `tagged-messaging` binary.
//!
//! - `produce`: build a tagged message and publish it
//! - `consume`: run a listener and print deliveries as JSON lines
//! - `create-topic`: create a topic if it does not exist

pub mod consume;
pub mod produce;
pub mod topic;

pub use consume::ConsumeArgs;
pub use produce::{ProduceArgs, ProduceMessage};
pub use topic::CreateTopicArgs;
