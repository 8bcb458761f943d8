//! Application state for Axum handlers.

use quill_config::PaginationConfig;
use quill_repository::PostRepository;
use quill_service::{CacheBackend, ListingService, PostCommandService};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub listing: Arc<dyn ListingService>,
    pub commands: Arc<dyn PostCommandService>,
    /// Probed by the readiness check.
    pub store: Arc<dyn PostRepository>,
    /// Probed by the readiness check; never fails it.
    pub cache: Arc<dyn CacheBackend>,
    pub pagination: PaginationConfig,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        listing: Arc<dyn ListingService>,
        commands: Arc<dyn PostCommandService>,
        store: Arc<dyn PostRepository>,
        cache: Arc<dyn CacheBackend>,
        pagination: PaginationConfig,
    ) -> Self {
        Self {
            listing,
            commands,
            store,
            cache,
            pagination,
        }
    }
}
