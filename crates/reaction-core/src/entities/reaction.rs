//! Reaction entity - an emoji annotation by one user on one post

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Reaction entity
///
/// Identified by the `(user_id, post_id, emoji_name)` triple. Uniqueness of the
/// triple is the store's business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub user_id: Snowflake,
    pub post_id: Snowflake,
    pub emoji_name: String,
    /// Assigned by the store when the reaction is saved
    pub create_at: Option<DateTime<Utc>>,
}

impl Reaction {
    /// Create a new, not yet stored Reaction
    pub fn new(user_id: Snowflake, post_id: Snowflake, emoji_name: impl Into<String>) -> Self {
        Self {
            user_id,
            post_id,
            emoji_name: emoji_name.into(),
            create_at: None,
        }
    }

    /// Check if the reaction has been stamped by the store
    #[inline]
    pub fn is_stored(&self) -> bool {
        self.create_at.is_some()
    }

    /// Check if two reactions name the same `(user, post, emoji)` triple
    pub fn same_triple(&self, other: &Reaction) -> bool {
        self.user_id == other.user_id
            && self.post_id == other.post_id
            && self.emoji_name == other.emoji_name
    }
}
