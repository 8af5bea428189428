//! # Media Boundary Types
//!
//! Value types crossing the `MediaStorage` port.

use bytes::Bytes;
use mime::Mime;

/// Upper bound for any single uploaded file (images, thumbnails,
/// profile pictures). Enforced before any network transfer is attempted.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// A file received from a client, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Mime,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn exceeds_limit(&self) -> bool {
        self.size() > MAX_UPLOAD_BYTES
    }
}

/// The durable result of a completed upload.
#[derive(Debug, Clone)]
pub struct StoredMedia {
    /// Publicly resolvable URL of the stored object.
    pub url: String,
}
