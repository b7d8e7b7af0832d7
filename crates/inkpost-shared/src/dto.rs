//! Data Transfer Objects - request/response types for the API.
//!
//! Post payloads use camelCase keys (`hasMore`, `isFeatured`, `createdAt`),
//! which existing clients paginate on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

/// Query string of `GET /posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPostsParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub cat: Option<String>,
    pub author: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    /// Any non-empty value restricts the listing to featured posts.
    pub featured: Option<String>,
}

impl ListPostsParams {
    pub fn featured_only(&self) -> bool {
        self.featured.as_deref().is_some_and(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDto {
    pub public_id: String,
    pub url: String,
}

/// Author summary embedded in post payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorDto {
    pub id: Uuid,
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub desc: String,
    pub category: Option<String>,
    pub content: String,
    pub image: Option<ImageDto>,
    pub visit: i64,
    pub is_featured: bool,
    pub user: AuthorDto,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsResponse {
    pub success: bool,
    pub posts: Vec<PostResponse>,
    pub has_more: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    #[serde(default)]
    pub desc: String,
    pub category: Option<String>,
    #[serde(default)]
    pub content: String,
    /// Image URL or data URI.
    pub image: Option<String>,
}

/// Partial update; absent or empty fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub desc: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturePostRequest {
    pub post_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_response_uses_has_more_key() {
        let body = serde_json::to_value(ListPostsResponse {
            success: true,
            posts: vec![],
            has_more: true,
        })
        .unwrap();
        assert_eq!(body["hasMore"], true);
    }

    #[test]
    fn featured_flag_is_truthy_on_any_value() {
        let mut params = ListPostsParams::default();
        assert!(!params.featured_only());
        params.featured = Some("true".into());
        assert!(params.featured_only());
        params.featured = Some(String::new());
        assert!(!params.featured_only());
    }
}
