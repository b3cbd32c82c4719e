//! # reaction-core
//!
//! Domain layer containing entities, value objects, broadcast events and the ports
//! through which the reaction lifecycle reaches its collaborators.
//! This crate has zero dependencies on infrastructure (storage engine, Redis, transport).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Channel, Post, Reaction, User, DEFAULT_CHANNEL_NAME};
pub use error::DomainError;
pub use events::{BroadcastEvent, EventKind};
pub use traits::{
    ChannelRepository, EventPublisher, Extension, ExtensionError, ExtensionRegistry, Hook,
    HookFlow, HookResult, PolicySource, PostCache, PostRepository, ReactionRepository,
    RepoResult, RoleAuthority, UserRepository,
};
pub use value_objects::{Permissions, Snowflake, SnowflakeParseError};
