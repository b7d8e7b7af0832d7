//! Middleware and request extractors.

pub mod error;

#[cfg(feature = "auth")]
pub mod auth;
