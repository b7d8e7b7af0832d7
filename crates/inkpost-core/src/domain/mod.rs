//! Domain entities - the core business objects.

mod listing;
mod post;
mod user;

pub use listing::{ListingQuery, PageWindow, PostFilter, PostPage, PostSort, SortMode};
pub use post::{NewPost, Post, PostChanges, PostImage, PostUpdate};
pub use user::{Role, User};
