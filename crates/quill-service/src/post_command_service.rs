//! Feed write use cases.

use crate::auth::Credentials;
use crate::dto::{CreatePostRequest, PostMutationResponse, UpdatePostRequest};
use async_trait::async_trait;
use quill_core::{PostId, QuillResult};

/// Write side of the feed.
///
/// Each operation checks credentials first, then validates, then touches the
/// store. Cache maintenance runs in the background and never changes the
/// result.
#[async_trait]
pub trait PostCommandService: Send + Sync {
    /// Fails with `Unauthorized` unless the credentials pass the gate.
    async fn authorize(&self, credentials: Option<&Credentials>) -> QuillResult<()>;

    /// Creates a post.
    async fn create_post(
        &self,
        credentials: Option<Credentials>,
        request: CreatePostRequest,
    ) -> QuillResult<PostMutationResponse>;

    /// Replaces a post's content.
    async fn update_post(
        &self,
        credentials: Option<Credentials>,
        id: PostId,
        request: UpdatePostRequest,
    ) -> QuillResult<PostMutationResponse>;

    /// Deletes a post.
    async fn delete_post(&self, credentials: Option<Credentials>, id: PostId) -> QuillResult<()>;
}
