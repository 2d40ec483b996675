//! Profile image storage.
//!
//! Uploaded images are written under a generated `<uuid>.<ext>` name and
//! referenced by `<url prefix>/<file name>`, the path the server serves them
//! from.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when storing or removing images.
#[derive(Debug, Error)]
pub enum ImageStoreError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The upload contained no bytes.
    #[error("uploaded image is empty")]
    EmptyUpload,

    /// The reference does not point inside this store.
    #[error("invalid image reference: {0}")]
    InvalidReference(String),
}

/// Port for storing uploaded profile images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist an upload and return its reference path.
    ///
    /// The original file name only contributes its extension.
    async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, ImageStoreError>;

    /// Remove a previously stored image. Missing files are not an error.
    async fn remove(&self, reference: &str) -> Result<(), ImageStoreError>;
}

/// Image store writing to a local directory.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
    url_prefix: String,
}

impl LocalImageStore {
    /// Create a store rooted at `root`, producing references under `url_prefix`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_owned(),
        }
    }

    /// Resolve a reference to a file inside the root.
    fn resolve(&self, reference: &str) -> Result<PathBuf, ImageStoreError> {
        let invalid = || ImageStoreError::InvalidReference(reference.to_owned());

        let file_name = reference
            .strip_prefix(self.url_prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(invalid)?;

        if file_name.is_empty()
            || file_name.starts_with('.')
            || file_name.contains(['/', '\\'])
        {
            return Err(invalid());
        }

        Ok(self.root.join(file_name))
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, ImageStoreError> {
        if bytes.is_empty() {
            return Err(ImageStoreError::EmptyUpload);
        }

        tokio::fs::create_dir_all(&self.root).await?;

        let file_name = unique_file_name(original_name);
        tokio::fs::write(self.root.join(&file_name), bytes).await?;

        tracing::debug!(file = %file_name, size = bytes.len(), "Stored profile image");
        Ok(format!("{}/{file_name}", self.url_prefix))
    }

    async fn remove(&self, reference: &str) -> Result<(), ImageStoreError> {
        let path = self.resolve(reference)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Generate a collision-resistant file name keeping the original extension.
///
/// The extension is lower-cased and dropped if it is not plain alphanumeric.
#[must_use]
pub fn unique_file_name(original_name: &str) -> String {
    let id = Uuid::new_v4();
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase);

    match extension {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}
