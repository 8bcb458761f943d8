//! In-process store used by tests and local development.

use crate::traits::{IdentityProvider, PostRepository};
use async_trait::async_trait;
use parking_lot::RwLock;
use quill_core::{PageRequest, Post, PostId, PostWithUser, QuillError, QuillResult, UserId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Post store held in memory.
///
/// Also acts as the identity provider for the authors registered with
/// [`with_user`](Self::with_user). Listing joins fall back to the author id
/// for unknown authors, matching the MySQL join.
#[derive(Debug, Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<PostId, Post>>,
    users: RwLock<HashMap<UserId, String>>,
    unavailable: AtomicBool,
}

impl InMemoryPostRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an author display name.
    #[must_use]
    pub fn with_user(self, user_id: UserId, name: impl Into<String>) -> Self {
        self.users.write().insert(user_id, name.into());
        self
    }

    /// Seeds the store with posts.
    #[must_use]
    pub fn with_posts(self, posts: impl IntoIterator<Item = Post>) -> Self {
        {
            let mut guard = self.posts.write();
            for post in posts {
                guard.insert(post.id, post);
            }
        }
        self
    }

    /// Makes every subsequent call fail with a database error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> QuillResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(QuillError::Database("store unavailable".to_string()));
        }
        Ok(())
    }

    fn sorted_page(&self, page: PageRequest) -> Vec<Post> {
        let mut posts: Vec<Post> = self.posts.read().values().cloned().collect();
        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.into_inner().cmp(&a.id.into_inner()))
        });

        let start = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        posts
            .into_iter()
            .skip(start)
            .take(page.limit as usize)
            .collect()
    }

    fn name_for(&self, user_id: UserId) -> String {
        self.users
            .read()
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| user_id.to_string())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_id(&self, id: PostId) -> QuillResult<Option<Post>> {
        self.check_available()?;
        Ok(self.posts.read().get(&id).cloned())
    }

    async fn find_page(&self, page: PageRequest) -> QuillResult<Vec<Post>> {
        self.check_available()?;
        Ok(self.sorted_page(page))
    }

    async fn find_page_with_user(&self, page: PageRequest) -> QuillResult<Vec<PostWithUser>> {
        self.check_available()?;
        Ok(self
            .sorted_page(page)
            .into_iter()
            .map(|post| {
                let name = self.name_for(post.user_id);
                post.with_user_name(name)
            })
            .collect())
    }

    async fn count(&self) -> QuillResult<u64> {
        self.check_available()?;
        Ok(self.posts.read().len() as u64)
    }

    async fn save(&self, post: &Post) -> QuillResult<Post> {
        self.check_available()?;
        self.posts.write().insert(post.id, post.clone());
        Ok(post.clone())
    }

    async fn update(&self, post: &Post) -> QuillResult<Post> {
        self.check_available()?;
        let mut posts = self.posts.write();
        match posts.get_mut(&post.id) {
            Some(existing) => {
                *existing = post.clone();
                Ok(post.clone())
            }
            None => Err(QuillError::not_found("Post", post.id)),
        }
    }

    async fn delete(&self, id: PostId) -> QuillResult<bool> {
        self.check_available()?;
        Ok(self.posts.write().remove(&id).is_some())
    }

    async fn ping(&self) -> QuillResult<()> {
        self.check_available()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryPostRepository {
    async fn display_name(&self, user_id: UserId) -> QuillResult<Option<String>> {
        self.check_available()?;
        Ok(self.users.read().get(&user_id).cloned())
    }
}
