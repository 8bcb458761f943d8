//! MySQL post repository implementation.

use crate::{traits::PostRepository, DatabasePool};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quill_core::{PageRequest, Post, PostId, PostWithUser, QuillError, QuillResult, UserId};
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// MySQL post repository implementation.
#[derive(Clone)]
pub struct MySqlPostRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlPostRepository {
    /// Creates a new MySQL post repository.
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

/// Database row representation of a post.
#[derive(Debug, FromRow)]
struct PostRow {
    id: String, // CHAR(36)
    user_id: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// A post row joined with the author's name.
#[derive(Debug, FromRow)]
struct PostWithUserRow {
    #[sqlx(flatten)]
    post: PostRow,
    user_name: String,
}

fn parse_uuid(value: &str) -> QuillResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| QuillError::Internal(format!("Invalid UUID in database: {}", e)))
}

impl TryFrom<PostRow> for Post {
    type Error = QuillError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        Ok(Post {
            id: PostId::from_uuid(parse_uuid(&row.id)?),
            user_id: UserId::from_uuid(parse_uuid(&row.user_id)?),
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<PostWithUserRow> for PostWithUser {
    type Error = QuillError;

    fn try_from(row: PostWithUserRow) -> Result<Self, Self::Error> {
        Ok(Post::try_from(row.post)?.with_user_name(row.user_name))
    }
}

#[async_trait]
impl PostRepository for MySqlPostRepository {
    async fn find_by_id(&self, id: PostId) -> QuillResult<Option<Post>> {
        debug!("Finding post by id: {}", id);

        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, user_id, content, created_at, updated_at
            FROM posts
            WHERE id = ?
            "#,
        )
        .bind(id.into_inner().to_string())
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(Post::try_from).transpose()
    }

    async fn find_page(&self, page: PageRequest) -> QuillResult<Vec<Post>> {
        debug!("Finding posts, page: {}, limit: {}", page.page, page.limit);

        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, user_id, content, created_at, updated_at
            FROM posts
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool.inner())
        .await?;

        rows.into_iter().map(Post::try_from).collect()
    }

    async fn find_page_with_user(&self, page: PageRequest) -> QuillResult<Vec<PostWithUser>> {
        debug!(
            "Finding posts with authors, page: {}, limit: {}",
            page.page, page.limit
        );

        // Posts whose author row is missing fall back to the author id.
        let rows = sqlx::query_as::<_, PostWithUserRow>(
            r#"
            SELECT p.id, p.user_id, p.content, p.created_at, p.updated_at,
                   COALESCE(u.name, p.user_id) AS user_name
            FROM posts p
            LEFT JOIN users u ON u.id = p.user_id
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool.inner())
        .await?;

        rows.into_iter().map(PostWithUser::try_from).collect()
    }

    async fn count(&self) -> QuillResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(self.pool.inner())
            .await?;
        Ok(u64::try_from(total).unwrap_or_default())
    }

    async fn save(&self, post: &Post) -> QuillResult<Post> {
        debug!("Saving post: {}", post.id);

        sqlx::query(
            r#"
            INSERT INTO posts (id, user_id, content, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(post.id.into_inner().to_string())
        .bind(post.user_id.into_inner().to_string())
        .bind(&post.content)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(self.pool.inner())
        .await?;

        Ok(post.clone())
    }

    async fn update(&self, post: &Post) -> QuillResult<Post> {
        debug!("Updating post: {}", post.id);

        let result = sqlx::query(
            r#"
            UPDATE posts
            SET content = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&post.content)
        .bind(post.updated_at)
        .bind(post.id.into_inner().to_string())
        .execute(self.pool.inner())
        .await?;

        if result.rows_affected() == 0 {
            return Err(QuillError::not_found("Post", post.id));
        }
        Ok(post.clone())
    }

    async fn delete(&self, id: PostId) -> QuillResult<bool> {
        debug!("Deleting post: {}", id);

        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id.into_inner().to_string())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> QuillResult<()> {
        self.pool.health_check().await
    }
}
