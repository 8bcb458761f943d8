//! Post entity and its listing projection.

use crate::{PostId, UserId};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// A single microblog post, owned by the primary store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Post {
    /// Unique identifier, generated at creation.
    pub id: PostId,

    /// Author identifier.
    pub user_id: UserId,

    /// Text content; never empty once persisted.
    pub content: String,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Creates a new post with a freshly generated identifier.
    ///
    /// Timestamps are truncated to microseconds so that a record read back
    /// from the store compares equal to the one written.
    #[must_use]
    pub fn new(user_id: UserId, content: String) -> Self {
        let now = Utc::now().trunc_subsecs(6);
        Self {
            id: PostId::new(),
            user_id,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the content and bumps the update timestamp.
    pub fn update_content(&mut self, content: String) {
        self.content = content;
        self.updated_at = Utc::now().trunc_subsecs(6);
    }

    /// Attaches the author's display name.
    #[must_use]
    pub fn with_user_name(self, user_name: impl Into<String>) -> PostWithUser {
        PostWithUser {
            post: self,
            user_name: user_name.into(),
        }
    }
}

/// A post joined with its author's display name.
///
/// Read-only projection recomputed on every store read; never mutated on
/// its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PostWithUser {
    #[serde(flatten)]
    pub post: Post,

    /// Denormalized author display name.
    pub user_name: String,
}

impl PostWithUser {
    /// Returns the post identifier.
    #[must_use]
    pub const fn id(&self) -> PostId {
        self.post.id
    }
}
