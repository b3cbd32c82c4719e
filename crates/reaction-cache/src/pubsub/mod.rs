//! Redis Pub/Sub module.
//!
//! Publishes reaction events onto per-channel Redis channels.

mod channels;
mod publisher;

pub use channels::{channel_topic, parse_channel_topic, CHANNEL_PREFIX};
pub use publisher::{PubSubEvent, RedisEventPublisher};
