use std::sync::Arc;
use std::time::Duration;

use accessplus_core::{ImageRef, ObjectStorage, ReportError};
use bytes::Bytes;
use tracing::{info, warn};

use crate::keys::{is_image, photo_key, DEFAULT_CONTENT_TYPE};

/// Lifetime of presigned photo URLs.
pub const SIGNED_URL_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);

/// Writes report photos and hands back their URLs.
#[derive(Clone)]
pub struct ImageStore {
    storage: Arc<dyn ObjectStorage>,
}

impl ImageStore {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    /// Store the photo for `report_id`, replacing any earlier one.
    pub async fn store(
        &self,
        report_id: &str,
        filename: Option<&str>,
        content_type: Option<&str>,
        data: Bytes,
    ) -> Result<ImageRef, ReportError> {
        let key = photo_key(report_id, filename);
        let content_type = content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE);
        if !is_image(content_type) {
            warn!(%key, content_type, "Storing upload with a non-image content type");
        }

        self.storage
            .put_object(&key, data, content_type)
            .await
            .map_err(|e| ReportError::Storage(format!("{e:#}")))?;

        let presigned_url = self
            .storage
            .signed_url(&key, SIGNED_URL_TTL)
            .await
            .map_err(|e| ReportError::Storage(format!("{e:#}")))?;

        info!(%key, backend = self.storage.name(), "Stored report photo");
        Ok(ImageRef {
            public_url: self.storage.public_url(&key),
            presigned_url,
            key,
        })
    }

    /// Fetch raw bytes for an existing object.
    pub async fn fetch(&self, key: &str) -> Result<Bytes, ReportError> {
        self.storage
            .get_object(key)
            .await
            .map_err(|e| ReportError::Storage(format!("{e:#}")))?
            .ok_or_else(|| ReportError::MissingObject(key.to_string()))
    }

    /// Keys in the bucket, optionally under `prefix`.
    pub async fn list(&self, prefix: Option<&str>) -> Result<Vec<String>, ReportError> {
        self.storage
            .list_keys(prefix)
            .await
            .map_err(|e| ReportError::Storage(format!("{e:#}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStorage;

    #[tokio::test]
    async fn stores_under_report_key_with_urls() {
        let storage = Arc::new(MemoryStorage::with_base_url("https://cdn.test"));
        let images = ImageStore::new(storage.clone());
        let image = images
            .store("R", Some("photo.png"), Some("image/png"), Bytes::from_static(b"png"))
            .await
            .unwrap();
        assert_eq!(image.key, "reports/R/photo.png");
        assert_eq!(image.public_url, "https://cdn.test/reports/R/photo.png");
        assert_eq!(
            image.presigned_url,
            "https://cdn.test/reports/R/photo.png?expires_in=604800"
        );
        assert_eq!(
            storage.content_type("reports/R/photo.png").await.as_deref(),
            Some("image/png")
        );
    }

    #[tokio::test]
    async fn defaults_extension_and_content_type() {
        let storage = Arc::new(MemoryStorage::new());
        let images = ImageStore::new(storage.clone());
        let image = images
            .store("R", Some("upload"), None, Bytes::from_static(b"jpg"))
            .await
            .unwrap();
        assert_eq!(image.key, "reports/R/photo.jpg");
        assert_eq!(
            storage.content_type("reports/R/photo.jpg").await.as_deref(),
            Some("image/jpeg")
        );
    }

    #[tokio::test]
    async fn fetch_missing_key_names_the_object() {
        let images = ImageStore::new(Arc::new(MemoryStorage::new()));
        let err = images.fetch("ramp.jpg").await.unwrap_err();
        assert!(matches!(err, ReportError::MissingObject(ref key) if key == "ramp.jpg"));
        assert_eq!(err.to_string(), "no object stored at key ramp.jpg");
    }
}
