//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod image;
mod repository;
mod time;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use image::{ImageError, ImageStore};
pub use repository::{BaseRepository, PostRepository, UserRepository};
pub use time::{Clock, SystemClock};
