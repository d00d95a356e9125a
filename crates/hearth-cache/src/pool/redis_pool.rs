//! Deadpool-backed Redis connection pool

use deadpool_redis::{Config, Connection, Pool, Runtime};
use std::sync::Arc;

/// Errors from the cache layer
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    #[error("Failed to create pool: {0}")]
    CreatePool(#[from] deadpool_redis::CreatePoolError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for cache operations
pub type RedisResult<T> = Result<T, CacheError>;

/// Pool configuration
#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    pub url: String,
    pub max_connections: usize,
}

impl Default for RedisPoolConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 10,
        }
    }
}

impl From<&hearth_common::RedisConfig> for RedisPoolConfig {
    fn from(config: &hearth_common::RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections as usize,
        }
    }
}

/// Redis connection pool
#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
    url: String,
}

/// Pool shared across services
pub type SharedRedisPool = Arc<RedisPool>;

impl RedisPool {
    /// Create a new pool from configuration
    ///
    /// # Errors
    /// Returns an error when the URL is malformed.
    pub fn new(config: RedisPoolConfig) -> RedisResult<Self> {
        let mut cfg = Config::from_url(&config.url);
        cfg.pool = Some(deadpool_redis::PoolConfig::new(config.max_connections));

        let pool = cfg.create_pool(Some(Runtime::Tokio1))?;

        Ok(Self {
            pool,
            url: config.url,
        })
    }

    /// Get a connection from the pool
    pub async fn get(&self) -> RedisResult<Connection> {
        Ok(self.pool.get().await?)
    }

    /// The Redis URL this pool connects to (used by the subscriber, which
    /// needs its own dedicated connection outside the pool)
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("url", &self.url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RedisPoolConfig::default();
        assert_eq!(config.url, "redis://127.0.0.1:6379");
        assert_eq!(config.max_connections, 10);
    }

    #[test]
    fn test_pool_creation_with_valid_url() {
        let pool = RedisPool::new(RedisPoolConfig::default());
        assert!(pool.is_ok());
    }

    #[test]
    fn test_pool_creation_with_invalid_url() {
        let config = RedisPoolConfig {
            url: "not-a-url".to_string(),
            max_connections: 2,
        };
        assert!(RedisPool::new(config).is_err());
    }
}
