//! # reaction-cache
//!
//! Redis adapters for the reaction lifecycle's two downstream ports.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Pub/Sub**: Channel-scoped event distribution (`EventPublisher`)
//! - **Post Cache**: Invalidation of cached channel post lists (`PostCache`)
//!
//! ## Example
//!
//! ```ignore
//! use reaction_cache::{RedisPool, RedisPoolConfig, RedisEventPublisher, RedisPostCache};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let publisher = Arc::new(RedisEventPublisher::new(pool.clone()));
//! let post_cache = Arc::new(RedisPostCache::new(pool));
//!
//! let ctx = ServiceContextBuilder::new()
//!     .publisher(publisher)
//!     .post_cache(post_cache)
//!     // ...
//!     .build()?;
//! ```

pub mod pool;
pub mod posts;
pub mod pubsub;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};

// Re-export post cache types
pub use posts::{channel_posts_key, channel_posts_pattern, RedisPostCache, CHANNEL_POSTS_PREFIX};

// Re-export pubsub types
pub use pubsub::{
    channel_topic, parse_channel_topic, PubSubEvent, RedisEventPublisher, CHANNEL_PREFIX,
};
