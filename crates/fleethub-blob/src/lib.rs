//! fleethub Blob Storage
//!
//! The [`BlobStore`] contract used for profile images, plus a
//! filesystem-backed implementation for local deployments.
//!
//! Deleting an absent blob is a no-op by contract: saga compensations may
//! run more than once and must stay safe when they do.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Error type for blob operations.
#[derive(Debug, Error)]
pub enum BlobError {
    /// The supplied payload was not valid base64.
    #[error("Invalid base64 payload: {0}")]
    InvalidData(String),

    /// Filesystem failure.
    #[error("Blob I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for blob operations.
pub type BlobResult<T> = Result<T, BlobError>;

/// Storage contract for binary objects addressed by URL.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Decode `data` (base64) and store it under `folder`, returning the
    /// public URL of the new blob.
    async fn upload_base64(&self, data: &str, folder: &str) -> BlobResult<String>;

    /// Delete the blob a previously returned URL points at.
    ///
    /// Deleting a URL that no longer resolves to a blob succeeds silently.
    async fn delete_by_url(&self, url: &str) -> BlobResult<()>;
}

/// Filesystem-backed [`BlobStore`].
///
/// Blobs land under `root/<folder>/<uuid>` and are addressed as
/// `<public_base_url>/<folder>/<uuid>`.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl FsBlobStore {
    /// Create a store rooted at `root`, serving URLs under
    /// `public_base_url`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        Self {
            root: root.into(),
            public_base_url,
        }
    }

    /// Map a public URL back to the path it was stored at.
    ///
    /// Returns `None` for URLs outside this store's base, which delete
    /// treats as already-absent.
    fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let relative = url.strip_prefix(&self.public_base_url)?;
        let relative = relative.trim_start_matches('/');
        // Reject anything that could escape the root.
        if relative.is_empty() || relative.split('/').any(|part| part == "..") {
            return None;
        }
        Some(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload_base64(&self, data: &str, folder: &str) -> BlobResult<String> {
        let bytes = BASE64
            .decode(data.trim())
            .map_err(|e| BlobError::InvalidData(e.to_string()))?;

        let name = Uuid::new_v4().to_string();
        let dir = self.root.join(folder);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&name), &bytes).await?;

        let url = format!("{}/{}/{}", self.public_base_url, folder, name);
        debug!(url = %url, size = bytes.len(), "Stored blob");
        Ok(url)
    }

    async fn delete_by_url(&self, url: &str) -> BlobResult<()> {
        let Some(path) = self.path_for_url(url) else {
            debug!(url = %url, "Delete of foreign blob URL ignored");
            return Ok(());
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
