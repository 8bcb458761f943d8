//! Cache payload encoding.
//!
//! Listing payloads carry a schema version:
//!
//! | shape                                   | schema |
//! |-----------------------------------------|--------|
//! | `[ ... ]`                               | v1 (legacy bare array) |
//! | `{"version":1,"posts":[...]}`           | v1 |
//! | `{"version":2,"posts":[...],"total":N}` | v2 |
//! | `{"posts":[...],"total":N}`             | v2 written before the tag existed |
//!
//! Every reader accepts all four. Writers only emit tagged v2. For v1 the
//! total is the number of posts in the payload.

use quill_core::{QuillError, QuillResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const LISTING_VERSION: u64 = 2;
const POST_VERSION: u64 = 1;

/// Schema a listing payload was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSchema {
    /// Bare sequence of posts.
    V1,
    /// Posts plus the stored total.
    V2,
}

/// A listing read back from the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedListing<T> {
    pub posts: Vec<T>,
    pub total: u64,
    pub schema: ListingSchema,
}

#[derive(Serialize)]
struct ListingEnvelopeRef<'a, T> {
    version: u64,
    posts: &'a [T],
    total: u64,
}

#[derive(Deserialize)]
struct ListingV1<T> {
    posts: Vec<T>,
}

#[derive(Deserialize)]
struct ListingV2<T> {
    posts: Vec<T>,
    total: u64,
}

#[derive(Serialize)]
struct PostEnvelopeRef<'a, T> {
    version: u64,
    post: &'a T,
}

#[derive(Deserialize)]
struct PostEnvelope<T> {
    version: u64,
    post: T,
}

/// Maps domain records to and from cache bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntitySerializer;

impl EntitySerializer {
    /// Encodes a listing page and its total as a v2 payload.
    pub fn encode_listing<T: Serialize>(posts: &[T], total: u64) -> QuillResult<Vec<u8>> {
        let envelope = ListingEnvelopeRef {
            version: LISTING_VERSION,
            posts,
            total,
        };
        Ok(serde_json::to_vec(&envelope)?)
    }

    /// Decodes a listing payload of any known schema.
    pub fn decode_listing<T: DeserializeOwned>(bytes: &[u8]) -> QuillResult<CachedListing<T>> {
        let value: Value = serde_json::from_slice(bytes).map_err(decode_error)?;

        if value.is_array() {
            let posts: Vec<T> = serde_json::from_value(value).map_err(decode_error)?;
            return Ok(v1(posts));
        }
        if !value.is_object() {
            return Err(QuillError::CacheDecode(
                "listing payload is neither an array nor an object".to_string(),
            ));
        }

        match value.get("version").map(Value::as_u64) {
            None | Some(Some(LISTING_VERSION)) => decode_v2(value),
            Some(Some(1)) => {
                let listing: ListingV1<T> = serde_json::from_value(value).map_err(decode_error)?;
                Ok(v1(listing.posts))
            }
            Some(Some(version)) => Err(QuillError::CacheDecode(format!(
                "unsupported listing schema version: {}",
                version
            ))),
            Some(None) => Err(QuillError::CacheDecode(
                "listing schema version is not an integer".to_string(),
            )),
        }
    }

    /// Encodes a single record.
    pub fn encode_post<T: Serialize>(post: &T) -> QuillResult<Vec<u8>> {
        let envelope = PostEnvelopeRef {
            version: POST_VERSION,
            post,
        };
        Ok(serde_json::to_vec(&envelope)?)
    }

    /// Decodes a single record.
    pub fn decode_post<T: DeserializeOwned>(bytes: &[u8]) -> QuillResult<T> {
        let envelope: PostEnvelope<T> = serde_json::from_slice(bytes).map_err(decode_error)?;
        if envelope.version != POST_VERSION {
            return Err(QuillError::CacheDecode(format!(
                "unsupported post schema version: {}",
                envelope.version
            )));
        }
        Ok(envelope.post)
    }
}

fn v1<T>(posts: Vec<T>) -> CachedListing<T> {
    CachedListing {
        total: posts.len() as u64,
        posts,
        schema: ListingSchema::V1,
    }
}

fn decode_v2<T: DeserializeOwned>(value: Value) -> QuillResult<CachedListing<T>> {
    let listing: ListingV2<T> = serde_json::from_value(value).map_err(decode_error)?;
    Ok(CachedListing {
        posts: listing.posts,
        total: listing.total,
        schema: ListingSchema::V2,
    })
}

fn decode_error(err: serde_json::Error) -> QuillError {
    QuillError::CacheDecode(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::{Post, PostWithUser, UserId};

    fn sample(n: usize) -> Vec<PostWithUser> {
        (0..n)
            .map(|i| Post::new(UserId::new(), format!("post {}", i)).with_user_name("Ada"))
            .collect()
    }

    #[test]
    fn test_writes_tagged_v2() {
        let bytes = EntitySerializer::encode_listing(&sample(1), 7).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["version"], 2);
        assert_eq!(value["total"], 7);
        assert_eq!(value["posts"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_structured_keeps_stored_total() {
        let posts = sample(2);
        let bytes = EntitySerializer::encode_listing(&posts, 42).unwrap();

        let listing = EntitySerializer::decode_listing::<PostWithUser>(&bytes).unwrap();
        assert_eq!(listing.posts, posts);
        assert_eq!(listing.total, 42);
        assert_eq!(listing.schema, ListingSchema::V2);
    }

    #[test]
    fn test_legacy_bare_array_counts_posts() {
        let posts = sample(3);
        let bytes = serde_json::to_vec(&posts).unwrap();

        let listing = EntitySerializer::decode_listing::<PostWithUser>(&bytes).unwrap();
        assert_eq!(listing.posts, posts);
        assert_eq!(listing.total, 3);
        assert_eq!(listing.schema, ListingSchema::V1);
    }

    #[test]
    fn test_empty_legacy_array() {
        let listing = EntitySerializer::decode_listing::<PostWithUser>(b"[]").unwrap();
        assert!(listing.posts.is_empty());
        assert_eq!(listing.total, 0);
    }

    #[test]
    fn test_untagged_structured_payload() {
        let posts = sample(1);
        let bytes = serde_json::to_vec(&serde_json::json!({ "posts": posts, "total": 9 })).unwrap();

        let listing = EntitySerializer::decode_listing::<PostWithUser>(&bytes).unwrap();
        assert_eq!(listing.total, 9);
        assert_eq!(listing.schema, ListingSchema::V2);
    }

    #[test]
    fn test_tagged_v1_object() {
        let posts = sample(2);
        let bytes = serde_json::to_vec(&serde_json::json!({ "version": 1, "posts": posts })).unwrap();

        let listing = EntitySerializer::decode_listing::<PostWithUser>(&bytes).unwrap();
        assert_eq!(listing.total, 2);
        assert_eq!(listing.schema, ListingSchema::V1);
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let bytes = br#"{"version":3,"posts":[],"total":0}"#;
        let err = EntitySerializer::decode_listing::<PostWithUser>(bytes).unwrap_err();
        assert!(matches!(err, QuillError::CacheDecode(_)));
    }

    #[test]
    fn test_garbage_is_rejected() {
        for bytes in [&b"\x00\xffnot json"[..], b"42", b"{\"posts\":\"nope\"}", b""] {
            let result = EntitySerializer::decode_listing::<PostWithUser>(bytes);
            assert!(matches!(result, Err(QuillError::CacheDecode(_))));
        }
    }

    #[test]
    fn test_post_envelope() {
        let post = sample(1).remove(0);
        let bytes = EntitySerializer::encode_post(&post).unwrap();

        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(EntitySerializer::decode_post::<PostWithUser>(&bytes).unwrap(), post);
    }

    #[test]
    fn test_untagged_post_is_rejected() {
        let post = sample(1).remove(0);
        let bytes = serde_json::to_vec(&post).unwrap();
        assert!(EntitySerializer::decode_post::<PostWithUser>(&bytes).is_err());
    }
}
