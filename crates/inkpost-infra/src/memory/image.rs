use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use inkpost_core::domain::PostImage;
use inkpost_core::ports::{ImageError, ImageStore};

/// Image store that keeps sources in process memory.
///
/// Remote URLs are kept as-is; anything else (e.g. data URIs) is served from a
/// `memory://` address.
#[derive(Default)]
pub struct InMemoryImageStore {
    folder: String,
    assets: RwLock<HashMap<String, String>>,
}

impl InMemoryImageStore {
    pub fn new(folder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            assets: RwLock::new(HashMap::new()),
        }
    }

    pub async fn contains(&self, public_id: &str) -> bool {
        self.assets.read().await.contains_key(public_id)
    }

    pub async fn len(&self) -> usize {
        self.assets.read().await.len()
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn upload(&self, source: &str) -> Result<PostImage, ImageError> {
        if source.trim().is_empty() {
            return Err(ImageError::InvalidSource("empty image source".to_string()));
        }

        let public_id = format!("{}/{}", self.folder, Uuid::new_v4());
        let url = if source.starts_with("https://") || source.starts_with("http://") {
            source.to_string()
        } else {
            format!("memory://{public_id}")
        };

        self.assets
            .write()
            .await
            .insert(public_id.clone(), source.to_string());
        tracing::debug!(%public_id, "Image stored");

        Ok(PostImage { public_id, url })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), ImageError> {
        self.assets.write().await.remove(public_id);
        Ok(())
    }
}
