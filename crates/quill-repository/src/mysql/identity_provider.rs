//! MySQL author lookup.

use crate::{traits::IdentityProvider, DatabasePool};
use async_trait::async_trait;
use quill_core::{QuillResult, UserId};
use std::sync::Arc;

/// Resolves display names from the `users` table.
#[derive(Clone)]
pub struct MySqlIdentityProvider {
    pool: Arc<DatabasePool>,
}

impl MySqlIdentityProvider {
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityProvider for MySqlIdentityProvider {
    async fn display_name(&self, user_id: UserId) -> QuillResult<Option<String>> {
        let name: Option<String> = sqlx::query_scalar("SELECT name FROM users WHERE id = ?")
            .bind(user_id.into_inner().to_string())
            .fetch_optional(self.pool.inner())
            .await?;
        Ok(name)
    }
}
