//! Pooled Redis connections (deadpool-redis).

use deadpool_redis::{Config, Connection, Pool, Runtime, Status};
use redis::AsyncCommands;

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_MAX_CONNECTIONS: usize = 16;

/// Pool settings
#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    /// Connection URL, credentials included
    pub url: String,
    pub max_connections: usize,
}

impl Default for RedisPoolConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REDIS_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl From<&reaction_common::RedisConfig> for RedisPoolConfig {
    fn from(config: &reaction_common::RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections as usize,
        }
    }
}

/// Redis adapter errors
#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("Invalid Redis pool settings: {0}")]
    CreatePool(String),

    #[error("No Redis connection available: {0}")]
    GetConnection(#[from] deadpool_redis::PoolError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Could not encode payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type RedisResult<T> = Result<T, RedisPoolError>;

/// Shared handle to a connection pool
///
/// Cloning shares the underlying pool.
#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl RedisPool {
    /// Build a pool; connections are opened on first use
    pub fn new(config: RedisPoolConfig) -> RedisResult<Self> {
        let invalid = |e: &dyn std::fmt::Display| RedisPoolError::CreatePool(e.to_string());

        let pool = Config::from_url(&config.url)
            .builder()
            .map_err(|e| invalid(&e))?
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| invalid(&e))?;

        tracing::info!(
            url = %redacted(&config.url),
            max_connections = config.max_connections,
            "Redis pool ready"
        );

        Ok(Self { pool })
    }

    pub fn from_config(config: &reaction_common::RedisConfig) -> RedisResult<Self> {
        Self::new(RedisPoolConfig::from(config))
    }

    pub async fn get(&self) -> RedisResult<Connection> {
        Ok(self.pool.get().await?)
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.pool.status()
    }

    /// Round-trip a PING
    pub async fn health_check(&self) -> RedisResult<()> {
        let mut conn = self.get().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }

    /// Delete `keys` plus every key matching `pattern`
    ///
    /// Matching keys are found with cursor-based `SCAN`, never `KEYS`. Returns
    /// the number of keys that existed.
    pub async fn purge(&self, keys: &[String], pattern: &str, batch: usize) -> RedisResult<i64> {
        let mut conn = self.get().await?;

        let mut doomed = keys.to_vec();
        let mut cursor: u64 = 0;
        loop {
            let (next, found): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(batch)
                .query_async(&mut conn)
                .await?;
            doomed.extend(found);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        if doomed.is_empty() {
            return Ok(0);
        }
        doomed.sort_unstable();
        doomed.dedup();

        Ok(conn.del(&doomed).await?)
    }
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("RedisPool")
            .field("size", &status.size)
            .field("available", &status.available)
            .finish()
    }
}

/// Host part of a URL, without credentials
fn redacted(url: &str) -> &str {
    url.rsplit_once('@').map_or(url, |(_, host)| host)
}
