//! # Media Store
//!
//! Stores uploaded images in a bucket directory and hands back the public
//! URL that gets persisted on the owning entity (`media_url`).
//!
//! Objects are written under a fresh UUID with the original file extension
//! kept (sanitized), so uploads never collide and never execute: the
//! bucket is served as static files only.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Fallback extension when the upload has none we trust.
const DEFAULT_EXTENSION: &str = "bin";

/// Longest extension we keep before falling back.
const MAX_EXTENSION_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media write failed: {0}")]
    Write(#[from] std::io::Error),
}

/// Filesystem-backed media bucket.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    public_base: String,
}

impl MediaStore {
    /// Creates a media store rooted at `root`, serving under `public_base`.
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        let public_base = public_base.into().trim_end_matches('/').to_string();
        MediaStore {
            root: root.into(),
            public_base,
        }
    }

    /// Directory the bucket writes into (mounted as static files).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stores an uploaded object and returns its public URL.
    pub async fn store(&self, original_name: &str, bytes: &[u8]) -> Result<String, MediaError> {
        let object_name = format!("{}.{}", Uuid::new_v4(), extension_of(original_name));

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&object_name), bytes).await?;

        debug!(object = %object_name, size = bytes.len(), "Stored media object");

        Ok(format!("{}/{}", self.public_base, object_name))
    }
}

/// Extracts a safe lowercase extension from an uploaded filename.
fn extension_of(original_name: &str) -> String {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or(DEFAULT_EXTENSION)
        .to_ascii_lowercase();

    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return DEFAULT_EXTENSION.to_string();
    }

    ext
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("photo.JPG"), "jpg");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("noext"), "bin");
        assert_eq!(extension_of("weird.e!xt"), "bin");
        assert_eq!(extension_of("dots...."), "bin");
    }

    #[tokio::test]
    async fn test_store_writes_object_and_builds_url() {
        let dir = std::env::temp_dir().join(format!("bodega-media-{}", Uuid::new_v4()));
        let store = MediaStore::new(&dir, "http://localhost:8000/media/");

        let url = store.store("photo.png", b"not really a png").await.unwrap();

        assert!(url.starts_with("http://localhost:8000/media/"));
        assert!(url.ends_with(".png"));

        let object_name = url.rsplit('/').next().unwrap();
        let stored = tokio::fs::read(dir.join(object_name)).await.unwrap();
        assert_eq!(stored, b"not really a png");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
