use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use inkpost_core::domain::{PageWindow, Post, PostChanges, PostFilter, PostSort};
use inkpost_core::error::RepoError;
use inkpost_core::ports::{BaseRepository, PostRepository};

/// Post store backed by a `HashMap` behind an async `RwLock`.
///
/// Note: data is lost on process restart.
#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn slug_taken(store: &HashMap<Uuid, Post>, slug: &str, exclude_id: Option<Uuid>) -> bool {
        store
            .values()
            .any(|p| p.slug == slug && Some(p.id) != exclude_id)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find(
        &self,
        filter: &PostFilter,
        sort: PostSort,
        window: PageWindow,
    ) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        let mut matched: Vec<&Post> = store.values().filter(|p| filter.matches(p)).collect();
        matched.sort_by(|a, b| sort.compare(a, b));

        Ok(matched
            .into_iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .cloned()
            .collect())
    }

    async fn count_all(&self) -> Result<u64, RepoError> {
        Ok(self.store.read().await.len() as u64)
    }

    async fn find_by_slug(
        &self,
        slug: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .values()
            .find(|p| p.slug == slug && Some(p.id) != exclude_id)
            .cloned())
    }

    async fn create(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;

        if Self::slug_taken(&store, &post.slug, None) {
            return Err(RepoError::Constraint(format!(
                "posts.slug '{}' already exists",
                post.slug
            )));
        }
        if store.contains_key(&post.id) {
            return Err(RepoError::Constraint("posts.id already exists".to_string()));
        }

        store.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;

        if let Some(slug) = &changes.slug {
            if Self::slug_taken(&store, slug, Some(id)) {
                return Err(RepoError::Constraint(format!(
                    "posts.slug '{slug}' already exists"
                )));
            }
        }

        let post = store.get_mut(&id).ok_or(RepoError::NotFound)?;
        changes.apply_to(post);
        Ok(post.clone())
    }

    async fn increment_visit(&self, slug: &str) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        let post = store
            .values_mut()
            .find(|p| p.slug == slug)
            .ok_or(RepoError::NotFound)?;
        post.visit += 1;
        Ok(())
    }

    async fn set_featured(&self, id: Uuid, featured: bool) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        let post = store.get_mut(&id).ok_or(RepoError::NotFound)?;
        post.is_featured = featured;
        Ok(post.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkpost_core::domain::NewPost;

    fn post(slug: &str) -> Post {
        Post::new(
            Uuid::new_v4(),
            slug.to_string(),
            NewPost {
                title: slug.to_string(),
                ..Default::default()
            },
            None,
        )
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_slug() {
        let repo = InMemoryPostRepository::new();
        repo.create(post("hello")).await.unwrap();

        let result = repo.create(post("hello")).await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
        assert_eq!(repo.count_all().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_allows_keeping_own_slug() {
        let repo = InMemoryPostRepository::new();
        let created = repo.create(post("hello")).await.unwrap();

        let updated = repo
            .update(
                created.id,
                PostChanges {
                    slug: Some("hello".into()),
                    desc: Some("new".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.desc, "new");
    }

    #[tokio::test]
    async fn test_find_by_slug_honours_exclusion() {
        let repo = InMemoryPostRepository::new();
        let created = repo.create(post("hello")).await.unwrap();

        assert!(repo.find_by_slug("hello", None).await.unwrap().is_some());
        assert!(
            repo.find_by_slug("hello", Some(created.id))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_increment_visit_unknown_slug() {
        let repo = InMemoryPostRepository::new();
        assert!(matches!(
            repo.increment_visit("missing").await,
            Err(RepoError::NotFound)
        ));
    }
}
