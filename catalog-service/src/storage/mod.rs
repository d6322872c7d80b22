//! Local staging and remote hosting for uploaded images.

pub mod github;
pub mod staging;

use std::path::Path;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use shared::CatalogError;

/// A successfully uploaded image on the remote host.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Publicly retrievable URL returned by the host.
    pub download_url: String,
    /// Path of the blob inside the hosting repository.
    pub remote_path: String,
    /// Blob identifier the host requires for later deletion.
    pub sha: String,
}

/// Remote host for image blobs.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Upload the file at `local_path` to `remote_path` and return the
    /// publicly retrievable URL. No retries; the first failure surfaces.
    async fn upload(
        &self,
        local_path: &Path,
        remote_path: &str,
    ) -> Result<UploadedImage, CatalogError>;

    /// Remove a previously uploaded image.
    async fn delete(&self, image: &UploadedImage) -> Result<(), CatalogError>;
}
