//! # S3 Media Adapter
//!
//! Direct uploads, pre-signed PUT URLs for the two-step video handshake,
//! and object removal for the upload saga.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use domains::{Error, MediaStorage, Result, StoredMedia, UploadFile};
use uuid::Uuid;

pub struct S3MediaStorage {
    client: Client,
    bucket: String,
    public_base: String,
}

impl S3MediaStorage {
    /// Builds a client from the ambient AWS credential chain.
    pub async fn from_env(bucket: String, region: String) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.clone()))
            .load()
            .await;
        let public_base = format!("https://{bucket}.s3.{region}.amazonaws.com");
        Self { client: Client::new(&config), bucket, public_base }
    }

    /// Client file names become `{uuid}/{sanitized-name}` keys so two
    /// uploads with the same name never collide.
    fn object_key(file_name: &str) -> String {
        let sanitized: String = file_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '-' })
            .collect();
        format!("{}/{sanitized}", Uuid::new_v4())
    }

    fn key_from_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        let path = url.split('?').next().unwrap_or(url);
        path.strip_prefix(self.public_base.as_str())
            .map(|key| key.trim_start_matches('/'))
            .filter(|key| !key.is_empty())
    }
}

#[async_trait]
impl MediaStorage for S3MediaStorage {
    async fn upload(&self, file: UploadFile) -> Result<StoredMedia> {
        let key = Self::object_key(&file.file_name);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(file.content_type.as_ref())
            .body(ByteStream::from(file.bytes))
            .send()
            .await
            .map_err(|err| {
                tracing::error!(%err, key, "s3 upload failed");
                Error::Internal("failed to upload file to object storage".into())
            })?;

        Ok(StoredMedia { url: format!("{}/{key}", self.public_base) })
    }

    async fn presign_upload(
        &self,
        file_name: &str,
        content_type: &mime::Mime,
        expires_in: Duration,
    ) -> Result<String> {
        let presigning = PresigningConfig::expires_in(expires_in).map_err(|err| {
            tracing::error!(%err, "invalid presigning expiry");
            Error::Internal("failed to issue upload URL".into())
        })?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(file_name)
            .content_type(content_type.as_ref())
            .presigned(presigning)
            .await
            .map_err(|err| {
                tracing::error!(%err, file_name, "s3 presign failed");
                Error::Internal("failed to issue upload URL".into())
            })?;

        Ok(request.uri().to_string())
    }

    async fn remove(&self, url: &str) -> Result<()> {
        let Some(key) = self.key_from_url(url) else {
            tracing::warn!(url, "refusing to remove object outside the media bucket");
            return Ok(());
        };
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(%err, key, "s3 delete failed");
                Error::Internal("failed to remove object from storage".into())
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keys_are_sanitized_and_prefixed() {
        let key = S3MediaStorage::object_key("my photo (1).jpg");
        let (prefix, name) = key.split_once('/').unwrap();
        assert!(Uuid::parse_str(prefix).is_ok());
        assert_eq!(name, "my-photo--1-.jpg");
    }
}
