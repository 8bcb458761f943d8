//! Cache-aside coordinator for feed data.

use super::cache_keys;
use super::serializer::{CachedListing, EntitySerializer};
use super::CacheBackend;
use crate::telemetry::{record_lookup, record_write};
use quill_core::{Post, PostId, PostWithUser, QuillError, QuillResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const VIEW_LISTING: &str = "listing";
const VIEW_PLAIN_LISTING: &str = "plain_listing";
const VIEW_POST: &str = "post";

/// Single point of contact for cache reads and writes.
///
/// Reads never fail: a backend miss, a backend error and an undecodable
/// payload all come back as `None`. Writes return their error so callers can
/// log it, but nothing on the request path should act on it. Every write
/// replaces the whole entry with the same fixed TTL.
pub struct PostCacheCoordinator {
    backend: Arc<dyn CacheBackend>,
    ttl: Duration,
}

impl PostCacheCoordinator {
    /// Creates a coordinator over the given backend.
    #[must_use]
    pub fn new(backend: Arc<dyn CacheBackend>, ttl: Duration) -> Self {
        Self { backend, ttl }
    }

    /// Returns the underlying backend.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn CacheBackend> {
        &self.backend
    }

    /// Returns the entry TTL.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Reads the joined feed listing.
    pub async fn get_listing(&self) -> Option<CachedListing<PostWithUser>> {
        self.lookup(VIEW_LISTING, cache_keys::POSTS_LISTING, |bytes| {
            EntitySerializer::decode_listing(bytes)
        })
        .await
    }

    /// Replaces the joined feed listing.
    pub async fn set_listing(&self, posts: &[PostWithUser], total: u64) -> QuillResult<()> {
        let bytes = EntitySerializer::encode_listing(posts, total)?;
        self.store(VIEW_LISTING, cache_keys::POSTS_LISTING, &bytes).await
    }

    /// Reads the listing without the author join.
    pub async fn get_plain_listing(&self) -> Option<CachedListing<Post>> {
        self.lookup(VIEW_PLAIN_LISTING, cache_keys::POSTS_PLAIN_LISTING, |bytes| {
            EntitySerializer::decode_listing(bytes)
        })
        .await
    }

    /// Replaces the listing without the author join.
    pub async fn set_plain_listing(&self, posts: &[Post], total: u64) -> QuillResult<()> {
        let bytes = EntitySerializer::encode_listing(posts, total)?;
        self.store(VIEW_PLAIN_LISTING, cache_keys::POSTS_PLAIN_LISTING, &bytes)
            .await
    }

    /// Reads a single post.
    pub async fn get_post(&self, id: PostId) -> Option<PostWithUser> {
        self.lookup(VIEW_POST, &cache_keys::post_by_id(id), |bytes| {
            EntitySerializer::decode_post(bytes)
        })
        .await
    }

    /// Replaces a single post.
    pub async fn set_post(&self, post: &PostWithUser) -> QuillResult<()> {
        let bytes = EntitySerializer::encode_post(post)?;
        self.store(VIEW_POST, &cache_keys::post_by_id(post.id()), &bytes)
            .await
    }

    /// Deletes both listing keys.
    ///
    /// Both deletes are attempted even if the first fails; the first error
    /// is returned. Deleting an absent key is not an error.
    pub async fn invalidate_posts(&self) -> QuillResult<()> {
        let joined = self.remove(VIEW_LISTING, cache_keys::POSTS_LISTING).await;
        let plain = self
            .remove(VIEW_PLAIN_LISTING, cache_keys::POSTS_PLAIN_LISTING)
            .await;
        joined.and(plain)
    }

    /// Deletes the listing without the author join.
    pub async fn invalidate_plain_listing(&self) -> QuillResult<()> {
        self.remove(VIEW_PLAIN_LISTING, cache_keys::POSTS_PLAIN_LISTING)
            .await
    }

    /// Deletes a single post's key.
    pub async fn invalidate_post(&self, id: PostId) -> QuillResult<()> {
        self.remove(VIEW_POST, &cache_keys::post_by_id(id)).await
    }

    async fn lookup<T>(
        &self,
        view: &'static str,
        key: &str,
        decode: impl FnOnce(&[u8]) -> QuillResult<T> + Send,
    ) -> Option<T> {
        let bytes = match self.backend.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!("Cache miss for key '{}'", key);
                record_lookup(view, "miss");
                return None;
            }
            Err(e) => {
                warn!("Cache read failed for key '{}', falling back: {}", key, e);
                record_lookup(view, "error");
                return None;
            }
        };

        match decode(&bytes) {
            Ok(value) => {
                debug!("Cache hit for key '{}'", key);
                record_lookup(view, "hit");
                Some(value)
            }
            Err(e) => {
                warn!("Undecodable cache payload under '{}', treating as miss: {}", key, e);
                record_lookup(view, "decode_error");
                None
            }
        }
    }

    async fn store(&self, view: &'static str, key: &str, bytes: &[u8]) -> QuillResult<()> {
        match self.backend.set(key, bytes, self.ttl).await {
            Ok(()) => {
                debug!("Cached key '{}' with TTL {}s", key, self.ttl.as_secs());
                record_write(view, "set");
                Ok(())
            }
            Err(e) => {
                record_write(view, "error");
                Err(e)
            }
        }
    }

    async fn remove(&self, view: &'static str, key: &str) -> QuillResult<()> {
        match self.backend.delete(key).await {
            Ok(existed) => {
                debug!("Invalidated key '{}' (present: {})", key, existed);
                record_write(view, "invalidate");
                Ok(())
            }
            Err(e) => {
                record_write(view, "error");
                Err(QuillError::cache_backend(format!(
                    "Failed to invalidate '{}': {}",
                    key, e
                )))
            }
        }
    }
}

impl std::fmt::Debug for PostCacheCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostCacheCoordinator")
            .field("backend", &self.backend.name())
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ManualClock, MemoryCacheBackend, DEFAULT_TTL};
    use async_trait::async_trait;
    use quill_core::UserId;

    /// Backend whose every call fails.
    struct UnreachableBackend;

    #[async_trait]
    impl CacheBackend for UnreachableBackend {
        async fn get(&self, _key: &str) -> QuillResult<Option<Vec<u8>>> {
            Err(QuillError::cache_backend("connection refused"))
        }
        async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> QuillResult<()> {
            Err(QuillError::cache_backend("connection refused"))
        }
        async fn delete(&self, _key: &str) -> QuillResult<bool> {
            Err(QuillError::cache_backend("connection refused"))
        }
        async fn exists(&self, _key: &str) -> QuillResult<bool> {
            Err(QuillError::cache_backend("connection refused"))
        }
        async fn ping(&self) -> QuillResult<()> {
            Err(QuillError::cache_backend("connection refused"))
        }
        async fn close(&self) -> QuillResult<()> {
            Ok(())
        }
        async fn flush_all(&self) -> QuillResult<()> {
            Err(QuillError::cache_backend("connection refused"))
        }
        fn name(&self) -> &'static str {
            "unreachable"
        }
    }

    fn setup() -> (Arc<ManualClock>, Arc<MemoryCacheBackend>, PostCacheCoordinator) {
        let clock = Arc::new(ManualClock::new());
        let backend = Arc::new(MemoryCacheBackend::with_clock(clock.clone()));
        let coordinator = PostCacheCoordinator::new(backend.clone(), DEFAULT_TTL);
        (clock, backend, coordinator)
    }

    fn sample_post(content: &str) -> PostWithUser {
        Post::new(UserId::new(), content.to_string()).with_user_name("Ada")
    }

    #[tokio::test]
    async fn test_listing_round_trip() {
        let (_, _, cache) = setup();
        let posts = vec![sample_post("a"), sample_post("b")];

        assert!(cache.get_listing().await.is_none());
        cache.set_listing(&posts, 12).await.unwrap();

        let listing = cache.get_listing().await.unwrap();
        assert_eq!(listing.posts, posts);
        assert_eq!(listing.total, 12);
    }

    #[tokio::test]
    async fn test_entries_expire_after_ttl() {
        let (clock, _, cache) = setup();
        let post = sample_post("short-lived");
        cache.set_listing(&[post.clone()], 1).await.unwrap();
        cache.set_post(&post).await.unwrap();

        assert!(cache.get_listing().await.is_some());
        assert!(cache.get_post(post.id()).await.is_some());

        clock.advance(DEFAULT_TTL);

        assert!(cache.get_listing().await.is_none());
        assert!(cache.get_post(post.id()).await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_posts_clears_both_listings() {
        let (_, _, cache) = setup();
        let post = sample_post("x");
        cache.set_listing(&[post.clone()], 1).await.unwrap();
        cache.set_plain_listing(&[post.post.clone()], 1).await.unwrap();
        cache.set_post(&post).await.unwrap();

        cache.invalidate_posts().await.unwrap();

        assert!(cache.get_listing().await.is_none());
        assert!(cache.get_plain_listing().await.is_none());
        assert!(cache.get_post(post.id()).await.is_some());

        // Second call finds nothing to delete.
        cache.invalidate_posts().await.unwrap();
    }

    #[tokio::test]
    async fn test_invalidate_post_only_touches_that_post() {
        let (_, _, cache) = setup();
        let first = sample_post("first");
        let second = sample_post("second");
        cache.set_post(&first).await.unwrap();
        cache.set_post(&second).await.unwrap();
        cache.set_listing(&[first.clone(), second.clone()], 2).await.unwrap();

        cache.invalidate_post(first.id()).await.unwrap();

        assert!(cache.get_post(first.id()).await.is_none());
        assert_eq!(cache.get_post(second.id()).await, Some(second));
        assert!(cache.get_listing().await.is_some());
    }

    #[tokio::test]
    async fn test_malformed_payload_is_a_miss() {
        let (_, backend, cache) = setup();
        backend
            .set(cache_keys::POSTS_LISTING, b"{not json", DEFAULT_TTL)
            .await
            .unwrap();

        assert!(cache.get_listing().await.is_none());
    }

    #[tokio::test]
    async fn test_legacy_payload_is_a_hit() {
        let (_, backend, cache) = setup();
        let posts = vec![sample_post("old format")];
        backend
            .set(
                cache_keys::POSTS_LISTING,
                &serde_json::to_vec(&posts).unwrap(),
                DEFAULT_TTL,
            )
            .await
            .unwrap();

        let listing = cache.get_listing().await.unwrap();
        assert_eq!(listing.posts, posts);
        assert_eq!(listing.total, 1);
    }

    #[tokio::test]
    async fn test_backend_errors_fold_into_miss() {
        let cache = PostCacheCoordinator::new(Arc::new(UnreachableBackend), DEFAULT_TTL);
        let post = sample_post("x");

        assert!(cache.get_listing().await.is_none());
        assert!(cache.get_post(post.id()).await.is_none());
        assert!(cache.set_listing(&[post], 1).await.is_err());
        assert!(matches!(
            cache.invalidate_posts().await,
            Err(QuillError::CacheBackend(_))
        ));
    }
}
