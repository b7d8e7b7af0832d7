//! Listing parameters and the store-facing query specification derived from them.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Post;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 2;

/// Ordering requested by a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Newest,
    Oldest,
    Popular,
    Trending,
}

impl SortMode {
    /// Parse a client supplied sort name. Anything unrecognized is `Newest`.
    pub fn parse(value: &str) -> Self {
        match value {
            "oldest" => SortMode::Oldest,
            "popular" => SortMode::Popular,
            "trending" => SortMode::Trending,
            _ => SortMode::Newest,
        }
    }
}

impl From<&str> for SortMode {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// Parameters of a single post listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub category: Option<String>,
    /// Author display name, resolved to an id before filtering.
    pub author: Option<String>,
    pub search: Option<String>,
    pub sort: SortMode,
    pub featured: bool,
    pub page: u64,
    pub limit: u64,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            category: None,
            author: None,
            search: None,
            sort: SortMode::Newest,
            featured: false,
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListingQuery {
    /// Skip/limit for the requested page.
    ///
    /// `None` when page or limit is zero, or when the window does not fit
    /// the signed 64-bit range stores bind it as.
    pub fn window(&self) -> Option<PageWindow> {
        if self.page == 0 || self.limit == 0 {
            return None;
        }

        let offset = (self.page - 1).checked_mul(self.limit)?;
        let window = PageWindow {
            offset,
            limit: self.limit,
        };
        window.in_range().then_some(window)
    }
}

/// Filter half of the store query. Unset fields are not applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub category: Option<String>,
    /// Literal, case-insensitive substring of the title. Never a pattern.
    pub title_contains: Option<String>,
    pub author_id: Option<Uuid>,
    pub featured_only: bool,
    pub created_after: Option<DateTime<Utc>>,
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        if let Some(category) = &self.category {
            if post.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if let Some(needle) = &self.title_contains {
            if !post.title.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(author_id) = self.author_id {
            if post.user_id != author_id {
                return false;
            }
        }
        if self.featured_only && !post.is_featured {
            return false;
        }
        if let Some(after) = self.created_after {
            if post.created_at < after {
                return false;
            }
        }
        true
    }
}

/// Sort half of the store query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostSort {
    #[default]
    CreatedDesc,
    CreatedAsc,
    VisitDesc,
}

impl PostSort {
    /// Ordering used by stores that sort in process. Ties fall back to newest first.
    pub fn compare(&self, a: &Post, b: &Post) -> Ordering {
        match self {
            PostSort::CreatedDesc => b.created_at.cmp(&a.created_at),
            PostSort::CreatedAsc => a.created_at.cmp(&b.created_at),
            PostSort::VisitDesc => b
                .visit
                .cmp(&a.visit)
                .then_with(|| b.created_at.cmp(&a.created_at)),
        }
    }
}

/// Skip/limit pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

impl PageWindow {
    /// Largest offset or limit a SQL store accepts.
    pub const MAX: u64 = i64::MAX as u64;

    pub fn in_range(&self) -> bool {
        self.offset <= Self::MAX && self.limit <= Self::MAX
    }
}

/// One page of listing results.
#[derive(Debug, Clone)]
pub struct PostPage {
    pub posts: Vec<Post>,
    /// `page * limit < total posts in the collection`, regardless of filters.
    pub has_more: bool,
}
