use std::sync::Arc;

use uuid::Uuid;

use crate::error::DomainResult;
use crate::ports::PostRepository;

/// Base slug for a title: spaces become hyphens, then everything is lower-cased.
/// No other characters are touched.
pub fn normalize_title(title: &str) -> String {
    title.replace(' ', "-").to_lowercase()
}

/// Picks a slug that no other post currently holds.
///
/// Collisions append `-2`, `-3`, ... to the previous candidate, so repeated
/// collisions chain (`foo`, `foo-2`, `foo-2-3`, ...). Persisted slugs rely on
/// this shape. The check is not atomic with the later write; the store's unique
/// index on `slug` is what finally rejects a duplicate.
pub struct SlugAllocator {
    posts: Arc<dyn PostRepository>,
}

impl SlugAllocator {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// Allocate a slug for `title`. `exclude_id` is the post being updated, so it
    /// never collides with itself.
    pub async fn allocate(&self, title: &str, exclude_id: Option<Uuid>) -> DomainResult<String> {
        let mut slug = normalize_title(title);
        let mut counter = 2u64;

        while self.posts.find_by_slug(&slug, exclude_id).await?.is_some() {
            slug = format!("{slug}-{counter}");
            counter += 1;
        }

        tracing::debug!(%slug, collisions = counter - 2, "Allocated slug");
        Ok(slug)
    }
}
