//! # Inkpost Shared
//!
//! Request/response types of the HTTP API, shared by the server and clients.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
