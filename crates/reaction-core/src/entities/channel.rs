//! Channel entity - the conversation a post lives in

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Reserved name of the default channel every team member joins
pub const DEFAULT_CHANNEL_NAME: &str = "town-square";

/// Channel entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: Snowflake,
    /// URL-safe unique name (`town-square`, `off-topic`, ...)
    pub name: String,
    pub display_name: String,
    /// Set when the channel is archived
    pub delete_at: Option<DateTime<Utc>>,
}

impl Channel {
    /// Create a new open channel
    #[must_use]
    pub fn new(id: Snowflake, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            display_name: name.clone(),
            name,
            delete_at: None,
        }
    }

    /// Check if the channel has been archived
    #[inline]
    #[must_use]
    pub fn is_archived(&self) -> bool {
        self.delete_at.is_some()
    }

    /// Check if this is the reserved default channel
    #[inline]
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_CHANNEL_NAME
    }

    /// Archive the channel
    pub fn archive(&mut self) {
        self.delete_at = Some(Utc::now());
    }
}
