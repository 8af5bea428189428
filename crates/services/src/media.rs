//! # Media Rules
//!
//! The pre-signed upload handshake and the extension table the platform
//! accepts for video creatives.

use std::sync::Arc;
use std::time::Duration;

use domains::{Error, MediaStorage, Result};
use mime::Mime;

/// How long an issued upload URL stays valid.
pub const PRESIGN_EXPIRY: Duration = Duration::from_secs(60);

/// Maps a video file name to its content type by extension.
/// Anything outside the supported set is a typed failure, checked before
/// storage is touched.
pub fn video_content_type(file_name: &str) -> Result<Mime> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());

    let essence = match extension.as_deref() {
        Some("mp4") => "video/mp4",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        _ => return Err(Error::UnsupportedMedia("unsupported video file type".into())),
    };

    essence
        .parse()
        .map_err(|_| Error::Internal("invalid built-in content type".into()))
}

/// Issues pre-signed upload URLs for the two-step video transfer.
pub struct MediaService {
    media: Arc<dyn MediaStorage>,
}

impl MediaService {
    pub fn new(media: Arc<dyn MediaStorage>) -> Self {
        Self { media }
    }

    pub async fn presign_video_upload(&self, file_name: &str) -> Result<String> {
        let content_type = video_content_type(file_name)?;
        self.media
            .presign_upload(file_name, &content_type, PRESIGN_EXPIRY)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_map_to_video_types() {
        assert_eq!(video_content_type("promo.mp4").unwrap().essence_str(), "video/mp4");
        assert_eq!(video_content_type("promo.MKV").unwrap().essence_str(), "video/x-matroska");
        assert_eq!(video_content_type("promo.mov").unwrap().essence_str(), "video/quicktime");
        assert_eq!(video_content_type("promo.avi").unwrap().essence_str(), "video/x-msvideo");
        assert_eq!(video_content_type("promo.webm").unwrap().essence_str(), "video/webm");
    }

    #[test]
    fn unknown_or_missing_extension_is_rejected() {
        assert!(matches!(
            video_content_type("promo.wmv"),
            Err(Error::UnsupportedMedia(_))
        ));
        assert!(matches!(video_content_type("promo"), Err(Error::UnsupportedMedia(_))));
    }
}
