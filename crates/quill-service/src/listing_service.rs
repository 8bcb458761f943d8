//! Feed read use cases.

use crate::dto::{PlainPostListResponse, PostDetailResponse, PostListResponse};
use async_trait::async_trait;
use quill_core::{PageRequest, PostId, QuillResult};

/// Read side of the feed.
///
/// Every response says whether it came from the cache or the store. Cache
/// trouble never fails a read; store trouble does.
#[async_trait]
pub trait ListingService: Send + Sync {
    /// Lists the feed joined with author names.
    async fn list_posts(&self, page: PageRequest) -> QuillResult<PostListResponse>;

    /// Lists the feed without the author join.
    async fn list_plain_posts(&self, page: PageRequest) -> QuillResult<PlainPostListResponse>;

    /// Gets a single post.
    async fn get_post(&self, id: PostId) -> QuillResult<PostDetailResponse>;
}
