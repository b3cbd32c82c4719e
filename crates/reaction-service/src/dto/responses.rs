//! Response DTOs
//!
//! These are the shapes serialized into event payloads. Snowflake IDs are
//! serialized as strings and timestamps as epoch milliseconds.

use serde::{Deserialize, Serialize};

/// Reaction as sent to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionResponse {
    pub user_id: String,
    pub post_id: String,
    pub emoji_name: String,
    /// Zero until the store has stamped the reaction
    pub create_at: i64,
}

/// Post as sent to clients in `post_edited` events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: String,
    pub channel_id: String,
    pub user_id: String,
    pub message: String,
    pub has_reactions: bool,
    pub create_at: i64,
    pub update_at: i64,
}
