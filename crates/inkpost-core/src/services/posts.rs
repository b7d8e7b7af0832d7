use std::future::Future;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{NewPost, Post, PostChanges, PostImage, PostUpdate, Role};
use crate::error::{DomainError, DomainResult, RepoError};
use crate::ports::{ImageStore, PostRepository, UserRepository};

use super::SlugAllocator;

pub const DEFAULT_MAX_SLUG_ATTEMPTS: u32 = 5;

/// The authenticated caller of a write operation.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn can_modify(&self, post: &Post) -> bool {
        post.is_owned_by(self.user_id) || self.is_admin()
    }
}

/// Post lifecycle: create, read, update, delete and featuring.
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    images: Arc<dyn ImageStore>,
    slugs: SlugAllocator,
    max_slug_attempts: u32,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            slugs: SlugAllocator::new(posts.clone()),
            posts,
            users,
            images,
            max_slug_attempts: DEFAULT_MAX_SLUG_ATTEMPTS,
        }
    }

    /// Bound on slug reallocations after the store rejects a duplicate.
    pub fn with_max_slug_attempts(mut self, attempts: u32) -> Self {
        self.max_slug_attempts = attempts.max(1);
        self
    }

    /// Fetch a post by slug, counting the view.
    pub async fn get_post(&self, slug: &str) -> DomainResult<Post> {
        match self.posts.increment_visit(slug).await {
            Ok(()) => {}
            Err(RepoError::NotFound) => return Err(DomainError::not_found("Post", slug)),
            Err(err) => return Err(err.into()),
        }

        self.posts
            .find_by_slug(slug, None)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", slug))
    }

    pub async fn create_post(&self, author_id: Uuid, draft: NewPost) -> DomainResult<Post> {
        if draft.title.trim().is_empty() {
            return Err(DomainError::InvalidInput("title is required".to_string()));
        }

        let author_id = self
            .users
            .find_by_id(author_id)
            .await?
            .map(|author| author.id)
            .ok_or_else(|| DomainError::not_found("User", author_id))?;

        let image = match draft.image.as_deref() {
            Some(source) if !source.is_empty() => Some(self.images.upload(source).await?),
            _ => None,
        };

        let posts = self.posts.clone();
        let title = draft.title.clone();
        let uploaded = image.clone();
        let result = self
            .write_with_slug(&title, None, move |slug| {
                let posts = posts.clone();
                let post = Post::new(author_id, slug, draft.clone(), uploaded.clone());
                async move { posts.create(post).await }
            })
            .await;

        match result {
            Ok(post) => {
                tracing::info!(post_id = %post.id, slug = %post.slug, %author_id, "Post created");
                Ok(post)
            }
            Err(err) => {
                if let Some(image) = image {
                    self.discard_image(&image).await;
                }
                Err(err)
            }
        }
    }

    pub async fn update_post(
        &self,
        actor: Actor,
        post_id: Uuid,
        update: PostUpdate,
    ) -> DomainResult<Post> {
        let post = self.load(post_id).await?;

        if !actor.can_modify(&post) {
            return Err(DomainError::Forbidden(
                "you can only update your own posts".to_string(),
            ));
        }

        let new_title = filled(update.title);
        let title_changed = new_title.as_deref().is_some_and(|t| t != post.title);

        let mut changes = PostChanges {
            title: new_title,
            desc: filled(update.desc),
            category: filled(update.category),
            content: filled(update.content),
            ..Default::default()
        };

        let new_image = match filled(update.image) {
            Some(source) => Some(self.images.upload(&source).await?),
            None => None,
        };
        changes.image = new_image.clone();

        let result = if title_changed {
            let title = changes.title.clone().unwrap_or_default();
            let posts = self.posts.clone();
            self.write_with_slug(&title, Some(post_id), move |slug| {
                let posts = posts.clone();
                let changes = PostChanges {
                    slug: Some(slug),
                    ..changes.clone()
                };
                async move { posts.update(post_id, changes).await }
            })
            .await
        } else {
            self.posts
                .update(post_id, changes)
                .await
                .map_err(DomainError::from)
        };

        match result {
            Ok(updated) => {
                if let (Some(_), Some(old)) = (&new_image, &post.image) {
                    self.discard_image(old).await;
                }
                tracing::info!(post_id = %updated.id, slug = %updated.slug, "Post updated");
                Ok(updated)
            }
            Err(err) => {
                if let Some(image) = new_image {
                    self.discard_image(&image).await;
                }
                Err(err)
            }
        }
    }

    /// Remove a post and its stored image.
    pub async fn delete_post(&self, actor: Actor, post_id: Uuid) -> DomainResult<()> {
        let post = self.load(post_id).await?;

        if !actor.can_modify(&post) {
            return Err(DomainError::Forbidden(
                "you can only delete your own posts".to_string(),
            ));
        }

        self.posts.delete(post_id).await?;

        if let Some(image) = &post.image {
            self.discard_image(image).await;
        }

        tracing::info!(post_id = %post_id, "Post deleted");
        Ok(())
    }

    /// Flip the featured flag. Admin only.
    pub async fn toggle_featured(&self, actor: Actor, post_id: Uuid) -> DomainResult<Post> {
        if !actor.is_admin() {
            return Err(DomainError::Forbidden(
                "only admins can feature posts".to_string(),
            ));
        }

        let post = self.load(post_id).await?;
        let updated = self.posts.set_featured(post_id, !post.is_featured).await?;

        tracing::info!(post_id = %post_id, featured = updated.is_featured, "Post featured flag toggled");
        Ok(updated)
    }

    async fn load(&self, post_id: Uuid) -> DomainResult<Post> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))
    }

    /// Allocate a slug and hand it to `write`, reallocating when the store
    /// reports a uniqueness violation, up to `max_slug_attempts` times.
    async fn write_with_slug<F, Fut>(
        &self,
        title: &str,
        exclude_id: Option<Uuid>,
        mut write: F,
    ) -> DomainResult<Post>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<Post, RepoError>>,
    {
        for attempt in 1..=self.max_slug_attempts {
            let slug = self.slugs.allocate(title, exclude_id).await?;

            match write(slug.clone()).await {
                Ok(post) => return Ok(post),
                Err(RepoError::Constraint(reason)) => {
                    tracing::warn!(%slug, attempt, %reason, "Slug taken at write time, reallocating");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(DomainError::Conflict(format!(
            "no unique slug for {title:?} after {} attempts",
            self.max_slug_attempts
        )))
    }

    async fn discard_image(&self, image: &PostImage) {
        if let Err(err) = self.images.destroy(&image.public_id).await {
            tracing::warn!(public_id = %image.public_id, error = %err, "Failed to remove stored image");
        }
    }
}

fn filled(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
