//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Post not found: {0}")]
    PostNotFound(Snowflake),

    #[error("Channel not found: {0}")]
    ChannelNotFound(Snowflake),

    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Reaction not found")]
    ReactionNotFound,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid emoji name: {0}")]
    InvalidEmojiName(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Reaction already exists")]
    ReactionAlreadyExists,

    // =========================================================================
    // Infrastructure Errors
    // =========================================================================
    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Lookup error: {0}")]
    LookupError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Publish error: {0}")]
    PublishError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::PostNotFound(_) => "UNKNOWN_POST",
            Self::ChannelNotFound(_) => "UNKNOWN_CHANNEL",
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::ReactionNotFound => "UNKNOWN_REACTION",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidEmojiName(_) => "INVALID_EMOJI_NAME",

            // Conflict
            Self::ReactionAlreadyExists => "REACTION_ALREADY_EXISTS",

            // Infrastructure
            Self::StoreError(_) => "STORE_ERROR",
            Self::LookupError(_) => "LOOKUP_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::PublishError(_) => "PUBLISH_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PostNotFound(_)
                | Self::ChannelNotFound(_)
                | Self::UserNotFound(_)
                | Self::ReactionNotFound
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_) | Self::InvalidEmojiName(_))
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ReactionAlreadyExists)
    }
}
