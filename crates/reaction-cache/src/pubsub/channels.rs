//! Pub/Sub topic naming.
//!
//! Every reaction event is scoped to the channel its post lives in and goes
//! out on `channel:{channel_id}`.

use reaction_core::Snowflake;

/// Topic prefix for channel-scoped events
pub const CHANNEL_PREFIX: &str = "channel:";

/// Redis topic carrying a channel's events
#[must_use]
pub fn channel_topic(channel_id: Snowflake) -> String {
    format!("{CHANNEL_PREFIX}{channel_id}")
}

/// Channel id behind a topic name, for subscribers
#[must_use]
pub fn parse_channel_topic(topic: &str) -> Option<Snowflake> {
    topic.strip_prefix(CHANNEL_PREFIX)?.parse().ok()
}
