//! Feed DTOs.

use quill_core::rules::not_blank;
use quill_core::{Post, PostWithUser};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Which layer answered a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Cache,
    Database,
}

/// One page of the feed.
///
/// On a cache hit `posts` and `total` are whatever the cache holds; `page`
/// and `limit` echo the request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostListResponse {
    pub posts: Vec<PostWithUser>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub source: ResponseSource,
}

/// One page of the feed without author names.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlainPostListResponse {
    pub posts: Vec<Post>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub source: ResponseSource,
}

/// A single post.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostDetailResponse {
    pub post: PostWithUser,
    pub source: ResponseSource,
}

/// Request to create a post.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePostRequest {
    #[validate(custom(function = "not_blank"))]
    pub content: String,
}

/// Request to replace a post's content.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePostRequest {
    #[validate(custom(function = "not_blank"))]
    pub content: String,
}

/// Result of a successful create or update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostMutationResponse {
    pub post: Post,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::ValidateExt;

    #[test]
    fn test_source_serializes_lowercase() {
        assert_eq!(serde_json::to_value(ResponseSource::Cache).unwrap(), "cache");
        assert_eq!(serde_json::to_value(ResponseSource::Database).unwrap(), "database");
    }

    #[test]
    fn test_blank_content_is_invalid() {
        let request = CreatePostRequest {
            content: "   ".to_string(),
        };
        assert!(request.validate_request().is_err());

        let request = CreatePostRequest {
            content: "hello".to_string(),
        };
        assert!(request.validate_request().is_ok());
    }
}
