//! Primary store contracts.

use async_trait::async_trait;
use quill_core::{PageRequest, Post, PostId, PostWithUser, QuillResult, UserId};

/// Durable post storage.
///
/// Listings are ordered newest first.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Finds a post by ID.
    async fn find_by_id(&self, id: PostId) -> QuillResult<Option<Post>>;

    /// Returns one page of posts without the author join.
    async fn find_page(&self, page: PageRequest) -> QuillResult<Vec<Post>>;

    /// Returns one page of posts joined with their author's display name.
    async fn find_page_with_user(&self, page: PageRequest) -> QuillResult<Vec<PostWithUser>>;

    /// Counts all posts.
    async fn count(&self) -> QuillResult<u64>;

    /// Saves a new post.
    async fn save(&self, post: &Post) -> QuillResult<Post>;

    /// Updates an existing post.
    async fn update(&self, post: &Post) -> QuillResult<Post>;

    /// Deletes a post by ID. Returns false when no such post existed.
    async fn delete(&self, id: PostId) -> QuillResult<bool>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> QuillResult<()>;
}

/// Resolves author display names.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the display name for an author, if the author is known.
    async fn display_name(&self, user_id: UserId) -> QuillResult<Option<String>>;
}
