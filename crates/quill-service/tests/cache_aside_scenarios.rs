//! End-to-end cache-aside behaviour over in-memory collaborators.

use async_trait::async_trait;
use quill_core::{PageRequest, QuillResult, UserId};
use quill_repository::InMemoryPostRepository;
use quill_service::{
    cache_keys, CacheBackend, CacheTaskQueue, CreatePostRequest, CreationCoordinator, Credentials,
    ListingRequestHandler, ListingService, MemoryCacheBackend, PostCacheCoordinator,
    PostCommandService, ResponseSource, StaticCredentialGate, TaskOutcome, DEFAULT_TTL,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Memory backend whose writes wait for a permit.
struct GatedBackend {
    inner: MemoryCacheBackend,
    writes: Semaphore,
}

impl GatedBackend {
    fn new() -> Self {
        Self {
            inner: MemoryCacheBackend::new(),
            writes: Semaphore::new(0),
        }
    }

    fn release(&self, writes: usize) {
        self.writes.add_permits(writes);
    }
}

#[async_trait]
impl CacheBackend for GatedBackend {
    async fn get(&self, key: &str) -> QuillResult<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> QuillResult<()> {
        let permit = self.writes.acquire().await.expect("gate closed");
        permit.forget();
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> QuillResult<bool> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> QuillResult<bool> {
        self.inner.exists(key).await
    }

    async fn ping(&self) -> QuillResult<()> {
        self.inner.ping().await
    }

    async fn close(&self) -> QuillResult<()> {
        self.inner.close().await
    }

    async fn flush_all(&self) -> QuillResult<()> {
        self.inner.flush_all().await
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}

struct App {
    backend: Arc<dyn CacheBackend>,
    tasks: CacheTaskQueue,
    reads: ListingRequestHandler,
    writes: CreationCoordinator,
}

fn app(backend: Arc<dyn CacheBackend>) -> App {
    let author = UserId::new();
    let store = Arc::new(InMemoryPostRepository::new().with_user(author, "admin"));
    let cache = Arc::new(PostCacheCoordinator::new(Arc::clone(&backend), DEFAULT_TTL));
    let tasks = CacheTaskQueue::new();

    let reads = ListingRequestHandler::new(
        store.clone(),
        store.clone(),
        Arc::clone(&cache),
        tasks.clone(),
    );
    let writes = CreationCoordinator::new(
        store,
        cache,
        tasks.clone(),
        Arc::new(StaticCredentialGate::new("admin", "secret")),
        author,
        PageRequest::first(),
    );

    App {
        backend,
        tasks,
        reads,
        writes,
    }
}

fn admin() -> Option<Credentials> {
    Some(Credentials::new("admin", "secret"))
}

fn hello() -> CreatePostRequest {
    CreatePostRequest {
        content: "hello".to_string(),
    }
}

#[tokio::test]
async fn create_is_visible_before_background_refresh_lands() {
    let backend = Arc::new(GatedBackend::new());
    let app = app(backend.clone());

    let created = app.writes.create_post(admin(), hello()).await.unwrap();
    assert_eq!(created.post.content, "hello");
    assert_eq!(app.tasks.in_flight(), 1);

    let listing = app.reads.list_posts(PageRequest::first()).await.unwrap();
    assert_eq!(listing.source, ResponseSource::Database);
    assert!(listing.posts.iter().any(|p| p.post.id == created.post.id));

    backend.release(2);
    app.tasks.settle().await;

    let listing = app.reads.list_posts(PageRequest::first()).await.unwrap();
    assert_eq!(listing.source, ResponseSource::Cache);
}

#[tokio::test]
async fn second_read_after_settle_comes_from_cache() {
    let app = app(Arc::new(MemoryCacheBackend::new()));
    app.writes.create_post(admin(), hello()).await.unwrap();
    app.tasks.settle().await;
    app.backend.flush_all().await.unwrap();

    let first = app.reads.list_posts(PageRequest::first()).await.unwrap();
    let second = app.reads.list_posts(PageRequest::first()).await.unwrap();
    assert_eq!(first.source, ResponseSource::Database);

    app.tasks.settle().await;

    let third = app.reads.list_posts(PageRequest::first()).await.unwrap();
    assert_eq!(third.source, ResponseSource::Cache);
    assert_eq!(third.total, first.total);
    // The second read raced the population; either answer is valid.
    assert_eq!(second.total, first.total);
}

#[tokio::test]
async fn malformed_listing_bytes_fall_back_to_store() {
    let app = app(Arc::new(MemoryCacheBackend::new()));
    app.writes.create_post(admin(), hello()).await.unwrap();
    app.tasks.settle().await;

    app.backend
        .set(cache_keys::POSTS_LISTING, b"]]not-json[[", DEFAULT_TTL)
        .await
        .unwrap();

    let listing = app.reads.list_posts(PageRequest::first()).await.unwrap();
    assert_eq!(listing.source, ResponseSource::Database);
    assert_eq!(listing.total, 1);
    assert_eq!(listing.posts[0].post.content, "hello");
}

#[tokio::test]
async fn created_post_round_trips_through_cache_and_store() {
    let app = app(Arc::new(MemoryCacheBackend::new()));
    let created = app.writes.create_post(admin(), hello()).await.unwrap().post;
    app.tasks.settle().await;

    let from_cache = app.reads.list_posts(PageRequest::first()).await.unwrap();
    assert_eq!(from_cache.source, ResponseSource::Cache);
    assert_eq!(from_cache.posts[0].post, created);

    let from_store = app.reads.get_post(created.id).await.unwrap();
    assert_eq!(from_store.source, ResponseSource::Database);
    assert_eq!(from_store.post.post, created);
    assert_eq!(from_store.post.user_name, "admin");
}

#[tokio::test]
async fn drain_cancels_refresh_stuck_on_the_backend() {
    let backend = Arc::new(GatedBackend::new());
    let app = app(backend.clone());

    app.writes.create_post(admin(), hello()).await.unwrap();
    assert_eq!(app.tasks.drain(Duration::from_millis(20)).await, 1);

    app.tasks.settle().await;
    let late = app.tasks.dispatch("late", async { Ok(()) });
    assert_eq!(late.settled().await, TaskOutcome::Cancelled);
    assert!(app.backend.get(cache_keys::POSTS_LISTING).await.unwrap().is_none());
}
