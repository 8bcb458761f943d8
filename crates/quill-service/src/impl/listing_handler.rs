//! Read path of the feed.

use crate::cache::PostCacheCoordinator;
use crate::dto::{PlainPostListResponse, PostDetailResponse, PostListResponse, ResponseSource};
use crate::listing_service::ListingService;
use crate::tasks::{CacheTaskQueue, TaskHandle};
use async_trait::async_trait;
use quill_core::{PageRequest, Post, PostId, PostWithUser, QuillError, QuillResult};
use quill_repository::{IdentityProvider, PostRepository};
use std::sync::Arc;
use tracing::{debug, error};

/// Answers feed reads from the cache, falling back to the store.
///
/// A listing hit returns the cached page and total as stored, whatever page
/// the caller asked for. A miss reads the requested page from the store and
/// queues a background write of that page under the same key.
pub struct ListingRequestHandler {
    posts: Arc<dyn PostRepository>,
    identities: Arc<dyn IdentityProvider>,
    cache: Arc<PostCacheCoordinator>,
    tasks: CacheTaskQueue,
}

impl ListingRequestHandler {
    #[must_use]
    pub fn new(
        posts: Arc<dyn PostRepository>,
        identities: Arc<dyn IdentityProvider>,
        cache: Arc<PostCacheCoordinator>,
        tasks: CacheTaskQueue,
    ) -> Self {
        Self {
            posts,
            identities,
            cache,
            tasks,
        }
    }

    fn repopulate_listing(&self, posts: Vec<PostWithUser>, total: u64) -> TaskHandle {
        let cache = Arc::clone(&self.cache);
        self.tasks.dispatch("set_listing", async move {
            cache.set_listing(&posts, total).await
        })
    }

    fn repopulate_plain_listing(&self, posts: Vec<Post>, total: u64) -> TaskHandle {
        let cache = Arc::clone(&self.cache);
        self.tasks.dispatch("set_plain_listing", async move {
            cache.set_plain_listing(&posts, total).await
        })
    }

    fn repopulate_post(&self, post: PostWithUser) -> TaskHandle {
        let cache = Arc::clone(&self.cache);
        self.tasks
            .dispatch("set_post", async move { cache.set_post(&post).await })
    }
}

fn log_store_error(err: QuillError) -> QuillError {
    error!("Store read failed: {}", err);
    err
}

#[async_trait]
impl ListingService for ListingRequestHandler {
    async fn list_posts(&self, page: PageRequest) -> QuillResult<PostListResponse> {
        if let Some(cached) = self.cache.get_listing().await {
            debug!(
                "Serving feed from cache ({} posts, total {})",
                cached.posts.len(),
                cached.total
            );
            return Ok(PostListResponse {
                posts: cached.posts,
                page: page.page,
                limit: page.limit,
                total: cached.total,
                source: ResponseSource::Cache,
            });
        }

        let (posts, total) =
            futures::try_join!(self.posts.find_page_with_user(page), self.posts.count())
                .map_err(log_store_error)?;
        debug!("Serving feed page {} from store", page.page);

        self.repopulate_listing(posts.clone(), total);

        Ok(PostListResponse {
            posts,
            page: page.page,
            limit: page.limit,
            total,
            source: ResponseSource::Database,
        })
    }

    async fn list_plain_posts(&self, page: PageRequest) -> QuillResult<PlainPostListResponse> {
        if let Some(cached) = self.cache.get_plain_listing().await {
            return Ok(PlainPostListResponse {
                posts: cached.posts,
                page: page.page,
                limit: page.limit,
                total: cached.total,
                source: ResponseSource::Cache,
            });
        }

        let (posts, total) = futures::try_join!(self.posts.find_page(page), self.posts.count())
            .map_err(log_store_error)?;

        self.repopulate_plain_listing(posts.clone(), total);

        Ok(PlainPostListResponse {
            posts,
            page: page.page,
            limit: page.limit,
            total,
            source: ResponseSource::Database,
        })
    }

    async fn get_post(&self, id: PostId) -> QuillResult<PostDetailResponse> {
        if let Some(post) = self.cache.get_post(id).await {
            return Ok(PostDetailResponse {
                post,
                source: ResponseSource::Cache,
            });
        }

        let post = self
            .posts
            .find_by_id(id)
            .await
            .map_err(log_store_error)?
            .ok_or_else(|| QuillError::not_found("Post", id))?;

        let user_name = self
            .identities
            .display_name(post.user_id)
            .await
            .map_err(log_store_error)?
            .unwrap_or_else(|| post.user_id.to_string());
        let post = post.with_user_name(user_name);

        self.repopulate_post(post.clone());

        Ok(PostDetailResponse {
            post,
            source: ResponseSource::Database,
        })
    }
}
