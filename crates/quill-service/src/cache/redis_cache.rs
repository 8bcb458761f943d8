//! Redis-based cache backend.

use super::CacheBackend;
use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use quill_config::RedisConfig;
use quill_core::{QuillError, QuillResult};
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, info};

/// Create a Redis connection pool.
///
/// Connections are established lazily, so this succeeds even while Redis is
/// down; the cache layer fails open until it comes back.
pub fn create_pool(config: &RedisConfig) -> QuillResult<Pool> {
    info!("Creating Redis connection pool...");

    Config::from_url(&config.url)
        .builder()
        .map_err(|e| QuillError::Configuration(format!("Invalid Redis config: {}", e)))?
        .max_size(config.pool_size)
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| QuillError::Configuration(format!("Failed to create Redis pool: {}", e)))
}

/// Redis cache backend over a deadpool connection pool.
pub struct RedisCacheBackend {
    pool: Pool,
}

impl RedisCacheBackend {
    /// Create a new Redis cache backend.
    #[must_use]
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Get a connection from the pool.
    async fn conn(&self) -> QuillResult<deadpool_redis::Connection> {
        self.pool.get().await.map_err(|e| {
            QuillError::cache_backend(format!("Failed to get Redis connection: {}", e))
        })
    }
}

#[async_trait]
impl CacheBackend for RedisCacheBackend {
    async fn get(&self, key: &str) -> QuillResult<Option<Vec<u8>>> {
        let mut conn = self.conn().await?;
        let value: Option<Vec<u8>> = conn.get(key).await.map_err(|e| {
            QuillError::cache_backend(format!("Failed to get key '{}': {}", key, e))
        })?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> QuillResult<()> {
        let mut conn = self.conn().await?;
        let ttl_secs = ttl.as_secs().max(1);

        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(|e| QuillError::cache_backend(format!("Failed to set key '{}': {}", key, e)))?;

        debug!("Cached key '{}' with TTL {}s", key, ttl_secs);
        Ok(())
    }

    async fn delete(&self, key: &str) -> QuillResult<bool> {
        let mut conn = self.conn().await?;
        let deleted: i64 = conn.del(key).await.map_err(|e| {
            QuillError::cache_backend(format!("Failed to delete key '{}': {}", key, e))
        })?;
        Ok(deleted > 0)
    }

    async fn exists(&self, key: &str) -> QuillResult<bool> {
        let mut conn = self.conn().await?;
        let exists: bool = conn.exists(key).await.map_err(|e| {
            QuillError::cache_backend(format!("Failed to check key '{}': {}", key, e))
        })?;
        Ok(exists)
    }

    async fn ping(&self) -> QuillResult<()> {
        let mut conn = self.conn().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut *conn)
            .await
            .map_err(|e| QuillError::cache_backend(format!("Ping failed: {}", e)))?;
        Ok(())
    }

    async fn close(&self) -> QuillResult<()> {
        info!("Closing Redis connection pool...");
        self.pool.close();
        Ok(())
    }

    async fn flush_all(&self) -> QuillResult<()> {
        let mut conn = self.conn().await?;
        redis::cmd("FLUSHALL")
            .query_async::<()>(&mut *conn)
            .await
            .map_err(|e| QuillError::cache_backend(format!("FLUSHALL failed: {}", e)))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
