use std::path::{Path, PathBuf};

use chrono::Utc;
use shared::CatalogError;
use tokio::fs;
use tracing::{debug, warn};

/// Scratch-directory stager for files in flight between the inbound
/// request and the remote upload.
#[derive(Debug, Clone)]
pub struct UploadStager {
    scratch_dir: PathBuf,
}

/// A file staged on scratch disk.
#[derive(Debug)]
pub struct StagedUpload {
    pub path: PathBuf,
    pub file_name: String,
}

impl UploadStager {
    /// Create the stager, creating the scratch directory if absent. The
    /// directory lives for the whole process; only per-request files are
    /// ever deleted from it.
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let scratch_dir = scratch_dir.into();
        std::fs::create_dir_all(&scratch_dir)?;
        Ok(Self { scratch_dir })
    }

    /// Write `data` under a timestamped name derived from the form field
    /// and the original file's extension.
    pub async fn stage(
        &self,
        field_name: &str,
        original_name: &str,
        data: &[u8],
    ) -> Result<StagedUpload, CatalogError> {
        let file_name =
            staged_file_name(field_name, original_name, Utc::now().timestamp_millis());
        let path = self.scratch_dir.join(&file_name);
        fs::write(&path, data).await?;
        debug!("Staged upload at {} ({} bytes)", path.display(), data.len());
        Ok(StagedUpload { path, file_name })
    }
}

impl StagedUpload {
    /// Delete the staged file. Best-effort: a failed unlink is logged and
    /// never propagated, so cleanup can run on success and error paths
    /// alike.
    pub async fn remove(self) {
        if let Err(err) = fs::remove_file(&self.path).await {
            warn!(
                "Failed to remove staged file {}: {}",
                self.path.display(),
                err
            );
        }
    }
}

/// `<fieldname>-<upload timestamp><original extension>`. Two uploads of
/// the same field in the same millisecond collide; accepted as negligible.
fn staged_file_name(field_name: &str, original_name: &str, timestamp_millis: i64) -> String {
    match Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(ext) => format!("{}-{}.{}", field_name, timestamp_millis, ext),
        None => format!("{}-{}", field_name, timestamp_millis),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_staged_file_name_keeps_extension() {
        assert_eq!(
            staged_file_name("image", "photo.jpg", 1700000000000),
            "image-1700000000000.jpg"
        );
        assert_eq!(
            staged_file_name("image", "archive.tar.gz", 1700000000000),
            "image-1700000000000.gz"
        );
    }

    #[test]
    fn test_staged_file_name_without_extension() {
        assert_eq!(
            staged_file_name("image", "photo", 1700000000000),
            "image-1700000000000"
        );
    }

    #[tokio::test]
    async fn test_stage_and_remove() {
        let dir = tempdir().unwrap();
        let stager = UploadStager::new(dir.path()).unwrap();

        let staged = stager.stage("image", "photo.png", b"png bytes").await.unwrap();
        assert!(staged.path.exists());
        assert!(staged.file_name.starts_with("image-"));
        assert!(staged.file_name.ends_with(".png"));
        assert_eq!(fs::read(&staged.path).await.unwrap(), b"png bytes");

        staged.remove().await;
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_remove_tolerates_missing_file() {
        let dir = tempdir().unwrap();
        let stager = UploadStager::new(dir.path()).unwrap();

        let staged = stager.stage("image", "photo.png", b"bytes").await.unwrap();
        std::fs::remove_file(&staged.path).unwrap();

        // Must not panic or error out.
        staged.remove().await;
    }

    #[test]
    fn test_new_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("uploads/scratch");
        UploadStager::new(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
