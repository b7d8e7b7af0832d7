use async_trait::async_trait;

use crate::domain::PostImage;

/// Storage for post cover images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store an image from `source` (URL or data URI) and return its reference.
    async fn upload(&self, source: &str) -> Result<PostImage, ImageError>;

    /// Remove a stored image. Unknown ids are not an error.
    async fn destroy(&self, public_id: &str) -> Result<(), ImageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Invalid image source: {0}")]
    InvalidSource(String),

    #[error("Image storage failed: {0}")]
    Storage(String),
}
