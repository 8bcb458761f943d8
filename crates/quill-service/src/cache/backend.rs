//! Cache backend contract.

use async_trait::async_trait;
use quill_core::QuillResult;
use std::time::Duration;

/// Byte-oriented key/value store with per-key TTL.
///
/// A `get` on an absent or expired key returns `Ok(None)`; `Err` is reserved
/// for transport and connectivity failures.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Reads a value.
    async fn get(&self, key: &str) -> QuillResult<Option<Vec<u8>>>;

    /// Writes a value, replacing any previous one, with the given TTL.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> QuillResult<()>;

    /// Deletes a key. Returns `true` if the key existed.
    async fn delete(&self, key: &str) -> QuillResult<bool>;

    /// Checks whether a live key exists.
    async fn exists(&self, key: &str) -> QuillResult<bool>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> QuillResult<()>;

    /// Releases the backend's connections.
    async fn close(&self) -> QuillResult<()>;

    /// Removes every key.
    async fn flush_all(&self) -> QuillResult<()>;

    /// Short backend name for logs and health output.
    fn name(&self) -> &'static str;
}
