//! Broadcast events - what the event bus carries to connected clients
//!
//! Events are scoped to a channel: every client watching that channel
//! receives them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::value_objects::Snowflake;

/// Kind of a broadcast event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ReactionAdded,
    ReactionRemoved,
    PostEdited,
}

impl EventKind {
    /// Wire name of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReactionAdded => "reaction_added",
            Self::ReactionRemoved => "reaction_removed",
            Self::PostEdited => "post_edited",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Channel-scoped event with a keyed payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastEvent {
    pub event: EventKind,
    pub channel_id: Snowflake,
    pub data: Map<String, Value>,
}

impl BroadcastEvent {
    /// Create an event with an empty payload
    pub fn new(event: EventKind, channel_id: Snowflake) -> Self {
        Self {
            event,
            channel_id,
            data: Map::new(),
        }
    }

    /// Add a payload entry
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Get a payload entry
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_names() {
        assert_eq!(EventKind::ReactionAdded.as_str(), "reaction_added");
        assert_eq!(EventKind::ReactionRemoved.to_string(), "reaction_removed");
        assert_eq!(
            serde_json::to_string(&EventKind::PostEdited).unwrap(),
            "\"post_edited\""
        );
    }

    #[test]
    fn test_event_payload() {
        let event = BroadcastEvent::new(EventKind::ReactionAdded, Snowflake::new(7))
            .with("reaction", "{\"emoji_name\":\"smile\"}");

        assert_eq!(event.channel_id, Snowflake::new(7));
        assert_eq!(
            event.get("reaction").and_then(Value::as_str),
            Some("{\"emoji_name\":\"smile\"}")
        );
        assert!(event.get("post").is_none());
    }

    #[test]
    fn test_event_serialization() {
        let event = BroadcastEvent::new(EventKind::PostEdited, Snowflake::new(7)).with("post", "{}");
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "post_edited");
        assert_eq!(json["channel_id"], "7");
        assert_eq!(json["data"]["post"], "{}");
    }
}
