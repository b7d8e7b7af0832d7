use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference to an image held by the image store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostImage {
    pub public_id: String,
    pub url: String,
}

/// Post entity - a blog article.
///
/// `slug` is unique across all posts; `user_id` and `created_at` never change
/// after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub slug: String,
    pub desc: String,
    pub category: Option<String>,
    pub content: String,
    pub image: Option<PostImage>,
    pub visit: i64,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new, unfeatured post with zero visits.
    pub fn new(user_id: Uuid, slug: String, draft: NewPost, image: Option<PostImage>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: draft.title,
            slug,
            desc: draft.desc,
            category: draft.category,
            content: draft.content,
            image,
            visit: 0,
            is_featured: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Author-supplied fields for a new post. `image` is an upload source handed
/// to the image store.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub desc: String,
    pub category: Option<String>,
    pub content: String,
    pub image: Option<String>,
}

/// Author-supplied fields for an update. Absent or empty values keep the
/// stored ones.
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub desc: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
}

/// Resolved column changes handed to `PostRepository::update`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub desc: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
    pub image: Option<PostImage>,
}

impl PostChanges {
    /// Apply the changes to an in-memory copy of a post.
    pub fn apply_to(self, post: &mut Post) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(slug) = self.slug {
            post.slug = slug;
        }
        if let Some(desc) = self.desc {
            post.desc = desc;
        }
        if let Some(category) = self.category {
            post.category = Some(category);
        }
        if let Some(content) = self.content {
            post.content = content;
        }
        if let Some(image) = self.image {
            post.image = Some(image);
        }
        post.updated_at = Utc::now();
    }
}
