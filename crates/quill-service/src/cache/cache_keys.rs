//! Cache key names.
//!
//! Listing keys are deliberately not parameterized by page or limit: a hit
//! returns whichever page was populated last.

use quill_core::PostId;

/// Key for the feed listing joined with author names.
pub const POSTS_LISTING: &str = "posts";

/// Key for the feed listing without the author join.
pub const POSTS_PLAIN_LISTING: &str = "posts:without_user";

/// Prefix for single-post keys.
pub const POST_PREFIX: &str = "post:";

/// Generate the cache key for a single post.
#[must_use]
pub fn post_by_id(id: PostId) -> String {
    format!("{}{}", POST_PREFIX, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_by_id_key() {
        let id = PostId::new();
        assert_eq!(post_by_id(id), format!("post:{}", id));
    }

    #[test]
    fn test_listing_keys_are_distinct() {
        assert_ne!(POSTS_LISTING, POSTS_PLAIN_LISTING);
        assert!(!POSTS_LISTING.starts_with(POST_PREFIX));
    }
}
