//! Application services built on the ports.

mod posts;
mod query;
mod slug;

pub use posts::{Actor, DEFAULT_MAX_SLUG_ATTEMPTS, PostService};
pub use query::{PostQueryService, TRENDING_WINDOW_DAYS};
pub use slug::{SlugAllocator, normalize_title};
