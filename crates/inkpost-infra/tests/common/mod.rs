//! Shared fixtures for service-level tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use inkpost_core::domain::{
    NewPost, PageWindow, Post, PostChanges, PostFilter, PostSort, Role, User,
};
use inkpost_core::error::RepoError;
use inkpost_core::ports::{BaseRepository, Clock, PostRepository, UserRepository};
use inkpost_core::services::{PostQueryService, PostService};
use inkpost_infra::{InMemoryImageStore, InMemoryPostRepository, InMemoryUserRepository};

/// Clock pinned to a single instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// In-memory post store that records calls and can simulate lost write races.
#[derive(Default)]
pub struct CountingPosts {
    pub inner: InMemoryPostRepository,
    pub finds: AtomicUsize,
    pub counts: AtomicUsize,
    pub creates: AtomicUsize,
    /// Number of upcoming writes that find their slug taken by a rival writer.
    pub lost_races: AtomicUsize,
    pub always_conflict: AtomicBool,
}

impl CountingPosts {
    pub fn lose_next_races(&self, n: usize) {
        self.lost_races.store(n, Ordering::SeqCst);
    }

    pub fn post_queries(&self) -> usize {
        self.finds.load(Ordering::SeqCst) + self.counts.load(Ordering::SeqCst)
    }

    fn take_lost_race(&self) -> bool {
        self.lost_races
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    async fn plant_rival(&self, slug: &str) {
        let rival = Post::new(
            Uuid::new_v4(),
            slug.to_string(),
            NewPost {
                title: format!("rival of {slug}"),
                ..Default::default()
            },
            None,
        );
        self.inner
            .create(rival)
            .await
            .expect("rival slug should be free when planted");
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for CountingPosts {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        self.inner.find_by_id(id).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.inner.delete(id).await
    }
}

#[async_trait]
impl PostRepository for CountingPosts {
    async fn find(
        &self,
        filter: &PostFilter,
        sort: PostSort,
        window: PageWindow,
    ) -> Result<Vec<Post>, RepoError> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.inner.find(filter, sort, window).await
    }

    async fn count_all(&self) -> Result<u64, RepoError> {
        self.counts.fetch_add(1, Ordering::SeqCst);
        self.inner.count_all().await
    }

    async fn find_by_slug(
        &self,
        slug: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<Post>, RepoError> {
        let found = self.inner.find_by_slug(slug, exclude_id).await;
        // Let a concurrent caller run between the existence check and the write.
        tokio::task::yield_now().await;
        found
    }

    async fn create(&self, post: Post) -> Result<Post, RepoError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if self.always_conflict.load(Ordering::SeqCst) {
            return Err(RepoError::Constraint("posts.slug".to_string()));
        }
        if self.take_lost_race() {
            self.plant_rival(&post.slug).await;
        }
        self.inner.create(post).await
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Post, RepoError> {
        if let Some(slug) = changes.slug.as_deref() {
            if self.take_lost_race() {
                self.plant_rival(slug).await;
            }
        }
        self.inner.update(id, changes).await
    }

    async fn increment_visit(&self, slug: &str) -> Result<(), RepoError> {
        self.inner.increment_visit(slug).await
    }

    async fn set_featured(&self, id: Uuid, featured: bool) -> Result<Post, RepoError> {
        self.inner.set_featured(id, featured).await
    }
}

pub struct Harness {
    pub now: DateTime<Utc>,
    pub posts: Arc<CountingPosts>,
    pub users: Arc<InMemoryUserRepository>,
    pub images: Arc<InMemoryImageStore>,
    pub query: PostQueryService,
    pub service: PostService,
}

impl Harness {
    pub fn new() -> Self {
        let now = Utc::now();
        let posts = Arc::new(CountingPosts::default());
        let users = Arc::new(InMemoryUserRepository::new());
        let images = Arc::new(InMemoryImageStore::new("posts"));

        let query = PostQueryService::new(
            posts.clone(),
            users.clone(),
            Arc::new(FixedClock(now)),
        );
        let service = PostService::new(posts.clone(), users.clone(), images.clone());

        Self {
            now,
            posts,
            users,
            images,
            query,
            service,
        }
    }

    pub async fn user(&self, name: &str, role: Role) -> User {
        let mut user = User::new(
            name.to_string(),
            format!("{name}@example.com"),
            "hash".to_string(),
        );
        user.role = role;
        self.users.create(user).await.expect("user fixture")
    }

    /// Insert a post directly, bypassing slug allocation.
    pub async fn seed(&self, author: &User, seed: Seed<'_>) -> Post {
        let mut post = Post::new(
            author.id,
            seed.slug
                .map(str::to_string)
                .unwrap_or_else(|| seed.title.to_lowercase().replace(' ', "-")),
            NewPost {
                title: seed.title.to_string(),
                desc: "desc".to_string(),
                category: seed.category.map(str::to_string),
                content: "content".to_string(),
                image: None,
            },
            None,
        );
        post.visit = seed.visit;
        post.is_featured = seed.featured;
        post.created_at = self.now - seed.age;
        self.posts.inner.create(post).await.expect("post fixture")
    }
}

pub struct Seed<'a> {
    pub title: &'a str,
    pub slug: Option<&'a str>,
    pub category: Option<&'a str>,
    pub visit: i64,
    pub age: Duration,
    pub featured: bool,
}

impl<'a> Seed<'a> {
    pub fn titled(title: &'a str) -> Self {
        Self {
            title,
            slug: None,
            category: None,
            visit: 0,
            age: Duration::zero(),
            featured: false,
        }
    }

    pub fn category(mut self, category: &'a str) -> Self {
        self.category = Some(category);
        self
    }

    pub fn visits(mut self, visit: i64) -> Self {
        self.visit = visit;
        self
    }

    pub fn aged_hours(mut self, hours: i64) -> Self {
        self.age = Duration::hours(hours);
        self
    }

    pub fn featured(mut self) -> Self {
        self.featured = true;
        self
    }
}

pub fn draft(title: &str) -> NewPost {
    NewPost {
        title: title.to_string(),
        desc: "A short description".to_string(),
        category: Some("general".to_string()),
        content: "Body".to_string(),
        image: None,
    }
}
