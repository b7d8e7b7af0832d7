//! In-memory adapters - used when no database is configured and in tests.
//!
//! They enforce the same uniqueness rules as the SQL schema so the slug
//! conflict path behaves identically.

mod image;
mod posts;
mod users;

pub use image::InMemoryImageStore;
pub use posts::InMemoryPostRepository;
pub use users::InMemoryUserRepository;
