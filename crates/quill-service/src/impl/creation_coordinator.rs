//! Write path of the feed.

use crate::auth::{AuthGate, Credentials};
use crate::cache::PostCacheCoordinator;
use crate::dto::{CreatePostRequest, PostMutationResponse, UpdatePostRequest};
use crate::post_command_service::PostCommandService;
use crate::tasks::{CacheTaskQueue, TaskHandle};
use async_trait::async_trait;
use quill_core::{PageRequest, Post, PostId, QuillError, QuillResult, UserId, ValidateExt};
use quill_repository::PostRepository;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Orchestrates creates, updates and deletes.
///
/// After a create the first feed page is re-read from the store and written
/// to the cache in the background; if that re-read fails the listings are
/// invalidated instead. Updates and deletes invalidate. The response never
/// waits on any of it.
pub struct CreationCoordinator {
    posts: Arc<dyn PostRepository>,
    cache: Arc<PostCacheCoordinator>,
    tasks: CacheTaskQueue,
    auth: Arc<dyn AuthGate>,
    author_id: UserId,
    refresh_page: PageRequest,
}

impl CreationCoordinator {
    /// Creates a coordinator.
    ///
    /// Posts are attributed to `author_id`; `refresh_page` is the page
    /// re-read after a create.
    #[must_use]
    pub fn new(
        posts: Arc<dyn PostRepository>,
        cache: Arc<PostCacheCoordinator>,
        tasks: CacheTaskQueue,
        auth: Arc<dyn AuthGate>,
        author_id: UserId,
        refresh_page: PageRequest,
    ) -> Self {
        Self {
            posts,
            cache,
            tasks,
            auth,
            author_id,
            refresh_page,
        }
    }

    async fn refresh_after_create(&self) -> TaskHandle {
        let cache = Arc::clone(&self.cache);

        let fresh = futures::try_join!(
            self.posts.find_page_with_user(self.refresh_page),
            self.posts.count()
        );

        match fresh {
            Ok((posts, total)) => self.tasks.dispatch("refresh_listing", async move {
                let listing = cache.set_listing(&posts, total).await;
                let plain = cache.invalidate_plain_listing().await;
                listing.and(plain)
            }),
            Err(e) => {
                warn!("Could not re-read feed after create, invalidating: {}", e);
                self.tasks
                    .dispatch("invalidate_listings", async move { cache.invalidate_posts().await })
            }
        }
    }

    fn invalidate_after_change(&self, id: PostId) -> TaskHandle {
        let cache = Arc::clone(&self.cache);
        self.tasks.dispatch("invalidate_post", async move {
            let post = cache.invalidate_post(id).await;
            let listings = cache.invalidate_posts().await;
            post.and(listings)
        })
    }
}

#[async_trait]
impl PostCommandService for CreationCoordinator {
    async fn authorize(&self, credentials: Option<&Credentials>) -> QuillResult<()> {
        let Some(credentials) = credentials else {
            return Err(QuillError::unauthorized("Authentication required"));
        };
        if self.auth.check(credentials).await {
            Ok(())
        } else {
            debug!("Rejected credentials for '{}'", credentials.username);
            Err(QuillError::unauthorized("Invalid credentials"))
        }
    }

    async fn create_post(
        &self,
        credentials: Option<Credentials>,
        request: CreatePostRequest,
    ) -> QuillResult<PostMutationResponse> {
        self.authorize(credentials.as_ref()).await?;
        request.validate_request()?;

        let post = Post::new(self.author_id, request.content);
        let saved = self.posts.save(&post).await?;
        info!("Post created: {}", saved.id);

        self.refresh_after_create().await;

        Ok(PostMutationResponse {
            post: saved,
            message: "Post created successfully".to_string(),
        })
    }

    async fn update_post(
        &self,
        credentials: Option<Credentials>,
        id: PostId,
        request: UpdatePostRequest,
    ) -> QuillResult<PostMutationResponse> {
        self.authorize(credentials.as_ref()).await?;
        request.validate_request()?;

        let mut post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| QuillError::not_found("Post", id))?;

        post.update_content(request.content);
        let updated = self.posts.update(&post).await?;
        info!("Post updated: {}", id);

        self.invalidate_after_change(id);

        Ok(PostMutationResponse {
            post: updated,
            message: "Post updated successfully".to_string(),
        })
    }

    async fn delete_post(&self, credentials: Option<Credentials>, id: PostId) -> QuillResult<()> {
        self.authorize(credentials.as_ref()).await?;

        if !self.posts.delete(id).await? {
            return Err(QuillError::not_found("Post", id));
        }
        info!("Post deleted: {}", id);

        self.invalidate_after_change(id);
        Ok(())
    }
}

impl std::fmt::Debug for CreationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreationCoordinator")
            .field("author_id", &self.author_id)
            .field("refresh_page", &self.refresh_page)
            .finish_non_exhaustive()
    }
}
