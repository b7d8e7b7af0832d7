use std::sync::Arc;

use chrono::Duration;

use crate::domain::{ListingQuery, PageWindow, PostFilter, PostPage, PostSort, SortMode};
use crate::error::{DomainError, DomainResult};
use crate::ports::{Clock, PostRepository, UserRepository};

/// Length of the trailing window the `trending` sort is restricted to.
pub const TRENDING_WINDOW_DAYS: i64 = 7;

/// Builds and runs post listings.
pub struct PostQueryService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl PostQueryService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            posts,
            users,
            clock,
        }
    }

    /// List one page of posts.
    ///
    /// Fails with `NotFound` when an author name is given that matches no user;
    /// no post query is issued in that case. `has_more` is computed against the
    /// total number of posts, not the number matching the filter.
    ///
    /// A zero page or limit is rejected with `InvalidInput` rather than
    /// replaced by the defaults, as is a page whose offset overflows `i64`.
    pub async fn list_posts(&self, query: &ListingQuery) -> DomainResult<PostPage> {
        let window = query.window().ok_or_else(|| {
            DomainError::InvalidInput(format!(
                "page and limit must be positive and (page - 1) * limit at most {}",
                PageWindow::MAX
            ))
        })?;

        let (filter, sort) = self.build(query).await?;

        tracing::debug!(?filter, ?sort, ?window, "Listing posts");

        let posts = self.posts.find(&filter, sort, window).await?;
        let total = self.posts.count_all().await?;
        let has_more = query.page.saturating_mul(query.limit) < total;

        Ok(PostPage { posts, has_more })
    }

    async fn build(&self, query: &ListingQuery) -> DomainResult<(PostFilter, PostSort)> {
        let mut filter = PostFilter {
            category: non_empty(&query.category),
            title_contains: non_empty(&query.search),
            ..Default::default()
        };

        if let Some(name) = non_empty(&query.author) {
            let author = self
                .users
                .find_by_name(&name)
                .await?
                .ok_or_else(|| DomainError::not_found("User", &name))?;
            filter.author_id = Some(author.id);
        }

        filter.featured_only = query.featured;

        let sort = match query.sort {
            SortMode::Newest => PostSort::CreatedDesc,
            SortMode::Oldest => PostSort::CreatedAsc,
            SortMode::Popular => PostSort::VisitDesc,
            SortMode::Trending => {
                filter.created_after =
                    Some(self.clock.now() - Duration::days(TRENDING_WINDOW_DAYS));
                PostSort::VisitDesc
            }
        };

        Ok((filter, sort))
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}
