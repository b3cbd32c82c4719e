//! Cached channel post lists.
//!
//! Post lists are cached per channel under `channel_posts:{channel_id}` and
//! any derived keys (`channel_posts:{channel_id}:since:...`). A reaction
//! change drops all of them so the next read reflects the new state.

use async_trait::async_trait;
use reaction_core::{DomainError, PostCache, RepoResult, Snowflake};

use crate::pool::{RedisPool, RedisPoolError, RedisResult};

/// Key prefix for cached channel post lists
pub const CHANNEL_POSTS_PREFIX: &str = "channel_posts:";

const SCAN_BATCH: usize = 100;

/// Base key of a channel's cached post list
#[must_use]
pub fn channel_posts_key(channel_id: Snowflake) -> String {
    format!("{CHANNEL_POSTS_PREFIX}{channel_id}")
}

/// Pattern matching a channel's derived post list keys
#[must_use]
pub fn channel_posts_pattern(channel_id: Snowflake) -> String {
    format!("{CHANNEL_POSTS_PREFIX}{channel_id}:*")
}

/// Post cache backed by Redis
#[derive(Debug, Clone)]
pub struct RedisPostCache {
    pool: RedisPool,
}

impl RedisPostCache {
    /// Create a new post cache
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Delete every cached post list of a channel, returning how many were removed
    pub async fn purge_channel(&self, channel_id: Snowflake) -> RedisResult<i64> {
        let removed = self
            .pool
            .purge(
                &[channel_posts_key(channel_id)],
                &channel_posts_pattern(channel_id),
                SCAN_BATCH,
            )
            .await?;

        tracing::debug!(
            channel_id = %channel_id,
            removed = removed,
            "Invalidated cached channel posts"
        );

        Ok(removed)
    }
}

#[async_trait]
impl PostCache for RedisPostCache {
    async fn invalidate_channel_posts(&self, channel_id: Snowflake) -> RepoResult<()> {
        self.purge_channel(channel_id)
            .await
            .map(|_| ())
            .map_err(cache_error)
    }
}

fn cache_error(err: RedisPoolError) -> DomainError {
    DomainError::CacheError(err.to_string())
}
