//! # Local Media Adapter
//!
//! Content-addressable filesystem store for development machines.
//! Objects are keyed by their SHA-256 hash and sharded two levels deep,
//! which also deduplicates repeated uploads.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use domains::{Error, MediaStorage, Result, StoredMedia, UploadFile};
use sha2::{Digest, Sha256};
use tokio::fs;

pub struct LocalMediaStorage {
    /// Root directory for all uploads (e.g. "./data/uploads")
    root: PathBuf,
    /// Public URL prefix the HTTP layer serves the root under.
    url_prefix: String,
}

impl LocalMediaStorage {
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self { root, url_prefix }
    }

    /// Sharded path: "ab/cd/abcd...hash"
    fn sharded_path(&self, hash: &str) -> PathBuf {
        let mut path = self.root.clone();
        path.push(&hash[0..2]);
        path.push(&hash[2..4]);
        path.push(hash);
        path
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn upload(&self, file: UploadFile) -> Result<StoredMedia> {
        let mut hasher = Sha256::new();
        hasher.update(&file.bytes);
        let hash = hex::encode(hasher.finalize());

        let target = self.sharded_path(&hash);
        let parent = target
            .parent()
            .ok_or_else(|| Error::Internal("upload root has no parent directory".into()))?;

        fs::create_dir_all(parent).await.map_err(|err| {
            tracing::error!(%err, "failed to create upload directory");
            Error::Internal("failed to store file".into())
        })?;

        // Same bytes hash to the same key; rewriting is a no-op.
        if !fs::try_exists(&target).await.unwrap_or(false) {
            fs::write(&target, &file.bytes).await.map_err(|err| {
                tracing::error!(%err, "failed to write upload");
                Error::Internal("failed to store file".into())
            })?;
        }

        Ok(StoredMedia {
            url: format!("{}/{}/{}/{hash}", self.url_prefix, &hash[0..2], &hash[2..4]),
        })
    }

    async fn presign_upload(
        &self,
        _file_name: &str,
        _content_type: &mime::Mime,
        _expires_in: Duration,
    ) -> Result<String> {
        Err(Error::Internal(
            "pre-signed uploads require the s3 media backend".into(),
        ))
    }

    async fn remove(&self, url: &str) -> Result<()> {
        let Some(hash) = url.rsplit('/').next().filter(|h| h.len() == 64) else {
            tracing::warn!(url, "refusing to remove object outside the media root");
            return Ok(());
        };
        let target = self.sharded_path(hash);
        if let Err(err) = fs::remove_file(&target).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::error!(%err, "failed to remove upload");
                return Err(Error::Internal("failed to remove stored file".into()));
            }
        }
        Ok(())
    }
}
