//! Redis Pub/Sub publisher.
//!
//! Publishes reaction events to Redis channels for distribution to connected
//! clients.

use async_trait::async_trait;
use reaction_core::{BroadcastEvent, DomainError, EventPublisher, RepoResult, Snowflake};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use crate::pool::{RedisPool, RedisPoolError, RedisResult};
use crate::pubsub::channel_topic;

/// Event wrapper for Pub/Sub messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubSubEvent {
    /// Event type name (e.g., "reaction_added", "post_edited")
    pub event_type: String,
    /// Event payload
    pub data: serde_json::Value,
    /// Channel the event is scoped to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
}

impl PubSubEvent {
    /// Create a new event
    #[must_use]
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
            channel_id: None,
        }
    }

    /// Scope the event to a channel
    #[must_use]
    pub fn with_channel(mut self, channel_id: Snowflake) -> Self {
        self.channel_id = Some(channel_id.to_string());
        self
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<BroadcastEvent> for PubSubEvent {
    fn from(event: BroadcastEvent) -> Self {
        Self::new(event.event.as_str(), serde_json::Value::Object(event.data))
            .with_channel(event.channel_id)
    }
}

/// Event bus backed by Redis Pub/Sub
#[derive(Clone)]
pub struct RedisEventPublisher {
    pool: RedisPool,
}

impl RedisEventPublisher {
    /// Create a new publisher
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Publish an event on a topic, returning the number of receivers
    pub async fn publish_to(&self, topic: &str, event: &PubSubEvent) -> RedisResult<u32> {
        let payload = event.to_json()?;
        let mut conn = self.pool.get().await?;

        let receivers: u32 = conn.publish(topic, &payload).await?;

        tracing::debug!(
            topic = %topic,
            event_type = %event.event_type,
            receivers = receivers,
            "Published event"
        );

        Ok(receivers)
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, event: BroadcastEvent) -> RepoResult<()> {
        let topic = channel_topic(event.channel_id);
        let event = PubSubEvent::from(event);

        self.publish_to(&topic, &event)
            .await
            .map(|_| ())
            .map_err(publish_error)
    }
}

fn publish_error(err: RedisPoolError) -> DomainError {
    DomainError::PublishError(err.to_string())
}
