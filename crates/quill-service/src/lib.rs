//! # Quill Service
//!
//! The cache-aside layer of the feed and the use cases built on it.
//!
//! ```text
//! ListingRequestHandler ──┐            ┌── PostRepository (store)
//!                         ├─ PostCacheCoordinator ── EntitySerializer
//! CreationCoordinator ────┘            └── CacheBackend (Redis / memory)
//!          │
//!          └── CacheTaskQueue (background repopulation and invalidation)
//! ```

pub mod auth;
pub mod cache;
pub mod dto;
pub mod listing_service;
pub mod telemetry;
pub mod post_command_service;
pub mod tasks;
pub mod r#impl;

pub use auth::*;
pub use cache::*;
pub use dto::*;
pub use listing_service::*;
pub use post_command_service::*;
pub use r#impl::{CreationCoordinator, ListingRequestHandler};
pub use tasks::*;
