//! # Inkpost Core
//!
//! The domain layer of the Inkpost blogging backend.
//! Entities, ports and the post listing / slug services live here; this crate
//! has no infrastructure dependencies.

pub mod cancel;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, RepoError};
