//! On-disk storage for uploaded product photos.
//!
//! Files are named `<uuid>.<ext>`, with the extension taken from the sniffed
//! image format. Client-supplied file names never reach the filesystem.

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// Extension used when the bytes are not a recognized image format.
const FALLBACK_EXTENSION: &str = "bin";

/// Errors that can occur while storing an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Filesystem error.
    #[error("failed to write upload {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A file written by [`UploadStore::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// Generated file name, e.g. `1b4e...c2.png`.
    pub file_name: String,
    /// Full path on disk.
    pub path: PathBuf,
}

impl StoredUpload {
    /// Public URL path under `/uploads`.
    #[must_use]
    pub fn url_path(&self) -> String {
        format!("/uploads/{}", self.file_name)
    }
}

/// Writes upload bytes into a single directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Create a store rooted at `dir`. The directory is created lazily.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory uploads are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the upload directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Io` if the directory cannot be created.
    pub async fn ensure_dir(&self) -> Result<(), UploadError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| UploadError::Io {
                path: self.dir.clone(),
                source,
            })
    }

    /// Write `bytes` under a freshly generated name.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Io` if the directory or file cannot be written.
    pub async fn save(&self, bytes: &[u8]) -> Result<StoredUpload, UploadError> {
        self.ensure_dir().await?;

        let file_name = format!("{}.{}", Uuid::new_v4(), sniff_extension(bytes));
        let path = self.dir.join(&file_name);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| UploadError::Io {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "Upload stored");
        Ok(StoredUpload { file_name, path })
    }

    /// Remove a stored upload. Failures are logged, not returned.
    pub async fn discard(&self, upload: &StoredUpload) {
        if let Err(e) = tokio::fs::remove_file(&upload.path).await {
            tracing::warn!(path = %upload.path.display(), error = %e, "Failed to remove upload");
        }
    }
}

/// File extension for the image format the bytes look like.
fn sniff_extension(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or(FALLBACK_EXTENSION)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::ImageFormat;

    use super::*;
    use crate::services::images::tests::sample_image;

    #[tokio::test]
    async fn test_save_uses_generated_name_and_sniffed_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("uploads"));
        let bytes = sample_image(ImageFormat::Png);

        let stored = store.save(&bytes).await.unwrap();

        assert!(stored.file_name.ends_with(".png"));
        assert!(stored.path.starts_with(store.dir()));
        assert_eq!(std::fs::read(&stored.path).unwrap(), bytes);
        assert_eq!(stored.url_path(), format!("/uploads/{}", stored.file_name));
    }

    #[tokio::test]
    async fn test_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        let bytes = sample_image(ImageFormat::Jpeg);

        let a = store.save(&bytes).await.unwrap();
        let b = store.save(&bytes).await.unwrap();
        assert_ne!(a.file_name, b.file_name);
        assert!(a.file_name.ends_with(".jpg"));
    }

    #[tokio::test]
    async fn test_discard_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        let stored = store.save(&sample_image(ImageFormat::Png)).await.unwrap();

        store.discard(&stored).await;
        assert!(!stored.path.exists());

        // A second discard only logs.
        store.discard(&stored).await;
    }

    #[test]
    fn test_unknown_bytes_fall_back() {
        assert_eq!(sniff_extension(b"plain text"), FALLBACK_EXTENSION);
    }
}
