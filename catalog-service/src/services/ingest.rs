use std::sync::Arc;

use shared::CatalogError;
use tracing::{info, warn};

use crate::storage::{staging::UploadStager, ImageHost, UploadedImage};

/// Prefix for image blobs inside the hosting repository.
const REMOTE_PREFIX: &str = "image";

/// The image ingestion pipeline: stage to scratch disk, upload to the
/// remote host, then delete the staged file whether or not the upload
/// succeeded.
pub struct ImageIngest {
    stager: UploadStager,
    host: Arc<dyn ImageHost>,
}

impl ImageIngest {
    pub fn new(stager: UploadStager, host: Arc<dyn ImageHost>) -> Self {
        Self { stager, host }
    }

    /// Run the pipeline for one uploaded file. The staged file is removed
    /// before this returns, on both paths.
    pub async fn ingest(
        &self,
        field_name: &str,
        original_name: &str,
        data: &[u8],
    ) -> Result<UploadedImage, CatalogError> {
        let staged = self.stager.stage(field_name, original_name, data).await?;
        let remote_path = format!("{}/{}", REMOTE_PREFIX, staged.file_name);

        let result = self.host.upload(&staged.path, &remote_path).await;
        staged.remove().await;

        match &result {
            Ok(image) => info!("Image ingested: {}", image.download_url),
            Err(err) => warn!("Image ingest failed for {}: {}", remote_path, err),
        }
        result
    }

    /// Best-effort removal of an uploaded blob after a failed persist.
    /// Failure leaves an orphan and is only logged.
    pub async fn discard_remote(&self, image: &UploadedImage) {
        if let Err(err) = self.host.delete(image).await {
            warn!(
                "Failed to remove orphaned image {}: {}",
                image.remote_path, err
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MockImageHost;
    use tempfile::tempdir;

    fn stager_in(dir: &std::path::Path) -> UploadStager {
        UploadStager::new(dir).unwrap()
    }

    #[tokio::test]
    async fn test_ingest_uploads_staged_file_and_cleans_up() {
        let dir = tempdir().unwrap();
        let mut host = MockImageHost::new();
        host.expect_upload()
            .withf(|path, remote| path.exists() && remote.starts_with("image/image-"))
            .returning(|_, remote| {
                Ok(UploadedImage {
                    download_url: format!("https://raw.example.com/{}", remote),
                    remote_path: remote.to_string(),
                    sha: "abc123".to_string(),
                })
            });

        let ingest = ImageIngest::new(stager_in(dir.path()), Arc::new(host));
        let image = ingest.ingest("image", "photo.jpg", b"jpeg bytes").await.unwrap();

        assert!(image
            .download_url
            .starts_with("https://raw.example.com/image/image-"));
        assert!(image.download_url.ends_with(".jpg"));
        // Cleanup invariant: nothing left on scratch disk.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_ingest_cleans_up_on_upload_failure() {
        let dir = tempdir().unwrap();
        let mut host = MockImageHost::new();
        host.expect_upload()
            .returning(|_, _| Err(CatalogError::Upload("remote host returned 401".to_string())));

        let ingest = ImageIngest::new(stager_in(dir.path()), Arc::new(host));
        let result = ingest.ingest("image", "photo.jpg", b"jpeg bytes").await;

        assert!(matches!(result, Err(CatalogError::Upload(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_discard_remote_swallows_failure() {
        let dir = tempdir().unwrap();
        let mut host = MockImageHost::new();
        host.expect_delete()
            .returning(|_| Err(CatalogError::Upload("remote delete returned 503".to_string())));

        let ingest = ImageIngest::new(stager_in(dir.path()), Arc::new(host));
        let image = UploadedImage {
            download_url: "https://raw.example.com/image/image-1.png".to_string(),
            remote_path: "image/image-1.png".to_string(),
            sha: "abc123".to_string(),
        };

        // Must not panic or propagate.
        ingest.discard_remote(&image).await;
    }
}
