//! Application wiring.
//!
//! Builds the feed services from configuration and the chosen store and
//! cache, and tears them down in order on shutdown.

use axum::{routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use quill_config::AppConfig;
use quill_core::{PageRequest, QuillError, QuillResult, UserId};
use quill_repository::{IdentityProvider, PostRepository};
use quill_rest::{create_router, AppState};
use quill_service::{
    create_pool, CacheBackend, CacheTaskQueue, CreationCoordinator, ListingRequestHandler,
    MemoryCacheBackend, PostCacheCoordinator, RedisCacheBackend, StaticCredentialGate,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Selects the cache backend named by the configuration.
///
/// Redis connections are established lazily, so an unreachable Redis does
/// not stop startup; reads simply fall through to the store.
pub fn cache_backend(config: &AppConfig) -> QuillResult<Arc<dyn CacheBackend>> {
    if config.redis.enabled {
        let pool = create_pool(&config.redis)?;
        info!(pool_size = config.redis.pool_size, "Using Redis cache backend");
        Ok(Arc::new(RedisCacheBackend::new(pool)))
    } else {
        info!("Redis disabled, using in-process cache backend");
        Ok(Arc::new(MemoryCacheBackend::new()))
    }
}

/// The wired feed application.
pub struct App {
    state: AppState,
    backend: Arc<dyn CacheBackend>,
    tasks: CacheTaskQueue,
}

impl App {
    /// Wires the read and write paths over the given store and cache.
    pub fn wire(
        config: &AppConfig,
        store: Arc<dyn PostRepository>,
        identities: Arc<dyn IdentityProvider>,
        backend: Arc<dyn CacheBackend>,
    ) -> QuillResult<Self> {
        let author_id = UserId::parse(&config.security.admin_user_id).map_err(|e| {
            QuillError::Configuration(format!("security.admin_user_id: {}", e))
        })?;

        let cache = Arc::new(PostCacheCoordinator::new(
            Arc::clone(&backend),
            config.cache.ttl(),
        ));
        let tasks = CacheTaskQueue::new();

        let listing = ListingRequestHandler::new(
            Arc::clone(&store),
            identities,
            Arc::clone(&cache),
            tasks.clone(),
        );

        let refresh_page = PageRequest::with_ceiling(
            PageRequest::DEFAULT_PAGE,
            config.pagination.default_limit,
            config.pagination.max_limit,
        );
        let commands = CreationCoordinator::new(
            Arc::clone(&store),
            cache,
            tasks.clone(),
            Arc::new(StaticCredentialGate::from_config(&config.security)),
            author_id,
            refresh_page,
        );

        let state = AppState::new(
            Arc::new(listing),
            Arc::new(commands),
            store,
            Arc::clone(&backend),
            config.pagination.clone(),
        );

        Ok(Self {
            state,
            backend,
            tasks,
        })
    }

    /// Builds the HTTP router, with a scrape endpoint when a recorder is
    /// installed.
    pub fn router(&self, config: &AppConfig, metrics: Option<PrometheusHandle>) -> Router {
        let router = create_router(self.state.clone(), &config.server);

        match metrics {
            Some(handle) => {
                let path = config.observability.metrics_path.as_str();
                info!("Metrics exposed at {}", path);
                router.route(path, get(move || std::future::ready(handle.render())))
            }
            None => router,
        }
    }

    /// Background cache task queue.
    pub fn tasks(&self) -> &CacheTaskQueue {
        &self.tasks
    }

    /// Drains background cache tasks, then closes the cache backend.
    ///
    /// Returns the number of tasks aborted at the deadline.
    pub async fn shutdown(&self, drain_timeout: Duration) -> usize {
        let aborted = self.tasks.drain(drain_timeout).await;

        if let Err(e) = self.backend.close().await {
            warn!(error = %e, backend = self.backend.name(), "Failed to close cache backend");
        }

        aborted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use quill_repository::InMemoryPostRepository;
    use tower::ServiceExt;

    fn wired(config: &AppConfig) -> QuillResult<App> {
        let store = Arc::new(InMemoryPostRepository::new());
        App::wire(
            config,
            store.clone(),
            store,
            Arc::new(MemoryCacheBackend::new()),
        )
    }

    #[test]
    fn test_memory_backend_when_redis_disabled() {
        let mut config = AppConfig::default();
        config.redis.enabled = false;
        assert_eq!(cache_backend(&config).unwrap().name(), "memory");
    }

    #[test]
    fn test_redis_backend_when_enabled() {
        let config = AppConfig::default();
        assert_eq!(cache_backend(&config).unwrap().name(), "redis");
    }

    #[test]
    fn test_rejects_invalid_author_id() {
        let mut config = AppConfig::default();
        config.security.admin_user_id = "admin".to_string();
        assert!(matches!(wired(&config), Err(QuillError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_router_serves_feed() {
        let config = AppConfig::default();
        let app = wired(&config).unwrap();

        let response = app
            .router(&config, None)
            .oneshot(Request::get("/api/v1/posts").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_shutdown_closes_backend() {
        let config = AppConfig::default();
        let app = wired(&config).unwrap();

        assert_eq!(app.shutdown(Duration::from_millis(50)).await, 0);
        assert!(app.tasks().is_closed());
        assert!(app.backend.ping().await.is_err());
    }
}
