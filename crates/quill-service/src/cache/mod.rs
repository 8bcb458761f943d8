//! Caching infrastructure for the feed.
//!
//! Backends only move bytes. [`EntitySerializer`] owns the payload format and
//! [`PostCacheCoordinator`] owns key names, TTL, and the fail-open policy.

mod backend;
pub mod cache_keys;
mod coordinator;
mod memory_cache;
mod redis_cache;
mod serializer;

pub use backend::CacheBackend;
pub use coordinator::PostCacheCoordinator;
pub use memory_cache::{Clock, ManualClock, MemoryCacheBackend, SystemClock};
pub use redis_cache::{create_pool, RedisCacheBackend};
pub use serializer::{CachedListing, EntitySerializer, ListingSchema};

use std::time::Duration;

/// TTL applied to every cache entry unless configured otherwise (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);
