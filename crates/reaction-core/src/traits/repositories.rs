//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the storage layer provides
//! the implementation. A missing record is `Ok(None)`; `Err` means the
//! backend itself failed.

use async_trait::async_trait;

use crate::entities::{Channel, Post, Reaction, User};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Post Repository
// ============================================================================

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Find post by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Post>>;
}

// ============================================================================
// Channel Repository
// ============================================================================

#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// Find channel by ID, archived channels included
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Channel>>;
}

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;
}

// ============================================================================
// Reaction Repository
// ============================================================================

/// Store gateway for reactions
///
/// The store enforces uniqueness of the `(user, post, emoji)` triple.
#[async_trait]
pub trait ReactionRepository: Send + Sync {
    /// Persist a reaction, returning it with server-assigned fields filled in
    async fn save(&self, reaction: &Reaction) -> RepoResult<Reaction>;

    /// Remove a reaction
    async fn delete(&self, reaction: &Reaction) -> RepoResult<()>;

    /// List reactions on a post
    async fn find_by_post(
        &self,
        post_id: Snowflake,
        include_deleted: bool,
    ) -> RepoResult<Vec<Reaction>>;
}
