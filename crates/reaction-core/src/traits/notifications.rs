//! Ports for the event bus, the post cache, and the policy inputs

use async_trait::async_trait;

use crate::events::BroadcastEvent;
use crate::traits::RepoResult;
use crate::value_objects::{Permissions, Snowflake};

/// Real-time event bus
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event to every client watching its channel
    async fn publish(&self, event: BroadcastEvent) -> RepoResult<()>;
}

/// Read-through cache of channel post lists
#[async_trait]
pub trait PostCache: Send + Sync {
    /// Drop any cached view of a channel's posts
    async fn invalidate_channel_posts(&self, channel_id: Snowflake) -> RepoResult<()>;
}

/// Resolves role names to permissions
pub trait RoleAuthority: Send + Sync {
    /// Check whether any of the roles grants the permission
    fn roles_grant(&self, roles: &[String], permission: Permissions) -> bool;
}

/// Licensing and configuration inputs of the access policy
pub trait PolicySource: Send + Sync {
    /// Whether the deployment carries an active license
    fn has_license(&self) -> bool;

    /// Whether the default channel is read-only for non-administrators
    fn town_square_read_only(&self) -> bool;
}
