//! In-process cache backend with simulated-time support.

use super::CacheBackend;
use async_trait::async_trait;
use parking_lot::RwLock;
use quill_core::{QuillError, QuillResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of the current instant for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset_millis: AtomicU64,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_millis: AtomicU64::new(0),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let millis = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.offset_millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_millis(self.offset_millis.load(Ordering::SeqCst))
    }
}

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// Cache backend held in process memory.
///
/// Expired entries are dropped lazily on access. There is no capacity bound.
pub struct MemoryCacheBackend {
    entries: RwLock<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
    closed: AtomicBool,
}

impl MemoryCacheBackend {
    /// Creates a backend driven by the wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a backend driven by the given clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            closed: AtomicBool::new(false),
        }
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .read()
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_open(&self) -> QuillResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(QuillError::cache_backend("memory cache is closed"));
        }
        Ok(())
    }
}

impl Default for MemoryCacheBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryCacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCacheBackend")
            .field("entries", &self.entries.read().len())
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    async fn get(&self, key: &str) -> QuillResult<Option<Vec<u8>>> {
        self.ensure_open()?;
        let now = self.clock.now();

        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|entry| entry.expires_at <= now) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> QuillResult<()> {
        self.ensure_open()?;
        let now = self.clock.now();

        let mut entries = self.entries.write();
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> QuillResult<bool> {
        self.ensure_open()?;
        let now = self.clock.now();
        Ok(self
            .entries
            .write()
            .remove(key)
            .is_some_and(|entry| entry.expires_at > now))
    }

    async fn exists(&self, key: &str) -> QuillResult<bool> {
        self.ensure_open()?;
        let now = self.clock.now();
        Ok(self
            .entries
            .read()
            .get(key)
            .is_some_and(|entry| entry.expires_at > now))
    }

    async fn ping(&self) -> QuillResult<()> {
        self.ensure_open()
    }

    async fn close(&self) -> QuillResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        self.entries.write().clear();
        Ok(())
    }

    async fn flush_all(&self) -> QuillResult<()> {
        self.ensure_open()?;
        self.entries.write().clear();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    fn backend() -> (Arc<ManualClock>, MemoryCacheBackend) {
        let clock = Arc::new(ManualClock::new());
        let backend = MemoryCacheBackend::with_clock(clock.clone());
        (clock, backend)
    }

    #[tokio::test]
    async fn test_absent_key_is_a_miss() {
        let (_, cache) = backend();
        assert_eq!(cache.get("nope").await.unwrap(), None);
        assert!(!cache.exists("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let (clock, cache) = backend();
        cache.set("k", b"v", TTL).await.unwrap();

        clock.advance(TTL - Duration::from_secs(1));
        assert_eq!(cache.get("k").await.unwrap(), Some(b"v".to_vec()));

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_write_drops_expired_entries_under_other_keys() {
        let (clock, cache) = backend();
        for i in 0..100 {
            cache.set(&format!("post:{i}"), b"v", TTL).await.unwrap();
        }
        assert_eq!(cache.entries.read().len(), 100);

        clock.advance(TTL + Duration::from_secs(1));
        cache.set("posts", b"fresh", TTL).await.unwrap();

        assert_eq!(cache.entries.read().len(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_set_overwrites_and_resets_expiry() {
        let (clock, cache) = backend();
        cache.set("k", b"old", TTL).await.unwrap();
        clock.advance(Duration::from_secs(200));
        cache.set("k", b"new", TTL).await.unwrap();
        clock.advance(Duration::from_secs(200));

        assert_eq!(cache.get("k").await.unwrap(), Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_, cache) = backend();
        cache.set("k", b"v", TTL).await.unwrap();

        assert!(cache.delete("k").await.unwrap());
        assert!(!cache.delete("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_flush_all() {
        let (_, cache) = backend();
        cache.set("a", b"1", TTL).await.unwrap();
        cache.set("b", b"2", TTL).await.unwrap();
        assert_eq!(cache.len(), 2);

        cache.flush_all().await.unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_closed_backend_errors() {
        let (_, cache) = backend();
        cache.close().await.unwrap();

        assert!(matches!(cache.get("k").await, Err(QuillError::CacheBackend(_))));
        assert!(cache.ping().await.is_err());
    }
}
