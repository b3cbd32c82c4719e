//! # reaction-service
//!
//! Application layer: the reaction lifecycle (save, delete, list), the access
//! policy guarding it, and the notification fan-out that follows every
//! accepted mutation.
//!
//! ## Example
//!
//! ```ignore
//! let ctx = ServiceContextBuilder::new()
//!     .with_config(&config)
//!     .post_repo(posts)
//!     .channel_repo(channels)
//!     .user_repo(users)
//!     .reaction_repo(store)
//!     .publisher(Arc::new(RedisEventPublisher::new(pool.clone())))
//!     .post_cache(Arc::new(RedisPostCache::new(pool)))
//!     .extensions(host)
//!     .build()?;
//!
//! let saved = ReactionService::new(&ctx).save_reaction(request.into_reaction()).await?;
//! ```

pub mod dto;
pub mod extensions;
pub mod fanout;
pub mod services;

pub use dto::{PostResponse, ReactionRequest, ReactionResponse};
pub use extensions::ExtensionHost;
pub use fanout::{FanoutPool, FanoutStats, ImageProxy, MulticastReport, Multicaster, ReactionNotifier};
pub use services::{
    AccessDecision, AccessPolicy, DenyReason, Operation, ReactionService, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, SettingsPolicy, StaticRoleAuthority,
};
