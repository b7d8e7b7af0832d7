use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{PageWindow, Post, PostChanges, PostFilter, PostSort, User};
use crate::error::RepoError;

/// Lookup and removal shared by every repository.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Insert a new user. Fails with `Constraint` if the name or email is taken.
    async fn create(&self, user: User) -> Result<User, RepoError>;

    /// Find a user by display name (exact match).
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, RepoError>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Batch lookup; missing ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;
}

/// Post repository.
///
/// Implementations must enforce slug uniqueness at write time and report a
/// collision as `RepoError::Constraint`.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Posts matching `filter`, ordered by `sort`, restricted to `window`.
    async fn find(
        &self,
        filter: &PostFilter,
        sort: PostSort,
        window: PageWindow,
    ) -> Result<Vec<Post>, RepoError>;

    /// Number of posts in the collection, ignoring any filter.
    async fn count_all(&self) -> Result<u64, RepoError>;

    /// Find the post holding `slug`, skipping `exclude_id` when given.
    async fn find_by_slug(
        &self,
        slug: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<Post>, RepoError>;

    async fn create(&self, post: Post) -> Result<Post, RepoError>;

    /// Apply `changes` to post `id` and return the stored result.
    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Post, RepoError>;

    /// Bump the visit counter of the post holding `slug`.
    async fn increment_visit(&self, slug: &str) -> Result<(), RepoError>;

    async fn set_featured(&self, id: Uuid, featured: bool) -> Result<Post, RepoError>;
}
