//! Post entity - the message a reaction attaches to

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Post entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    pub message: String,
    /// Derived flag: whether at least one reaction exists on the post
    pub has_reactions: bool,
    pub create_at: DateTime<Utc>,
    pub update_at: DateTime<Utc>,
}

impl Post {
    /// Create a new Post
    pub fn new(id: Snowflake, channel_id: Snowflake, user_id: Snowflake, message: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            channel_id,
            user_id,
            message,
            has_reactions: false,
            create_at: now,
            update_at: now,
        }
    }

    /// Build the copy of this post that goes out in a post-edited notification
    ///
    /// The receiver is left untouched; the copy carries the given reaction flag
    /// and a fresh `update_at`.
    #[must_use]
    pub fn for_notification(&self, has_reactions: bool) -> Post {
        let mut post = self.clone();
        post.has_reactions = has_reactions;
        post.update_at = Utc::now();
        post
    }
}
