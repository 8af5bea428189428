//! # Ports
//!
//! Adapter contracts. Any storage, media, or identity backend must implement
//! these traits to be wired into the binary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

use crate::error::Result;
use crate::media::{StoredMedia, UploadFile};
use crate::models::{Ad, AdBoard, Booking, Company, User};

/// Persistence contract for ad boards.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AdBoardRepository: Send + Sync {
    async fn insert(&self, board: AdBoard) -> Result<AdBoard>;
    async fn find(&self, id: Uuid) -> Result<Option<AdBoard>>;
    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<AdBoard>>;
    /// Full replacement of every mutable column. `created_by` never changes.
    async fn update(&self, board: AdBoard) -> Result<AdBoard>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Persistence contract for creatives.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AdRepository: Send + Sync {
    async fn insert(&self, ad: Ad) -> Result<Ad>;
    async fn find(&self, id: Uuid) -> Result<Option<Ad>>;
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Ad>>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Persistence contract for bookings.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert(&self, booking: Booking) -> Result<Booking>;
    /// All bookings whose interval touches `[start, end]`, inclusive.
    async fn list_overlapping(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Booking>>;
    async fn find_by_ad(&self, ad_id: Uuid) -> Result<Vec<Booking>>;
    /// Moves every booking of an ad to a new display window.
    async fn reschedule(
        &self,
        ad_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<()>;
    async fn delete_by_ad(&self, ad_id: Uuid) -> Result<()>;
    async fn delete_by_board(&self, board_id: Uuid) -> Result<()>;
}

/// Persistence contract for accounts and their companies.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn insert(&self, user: User) -> Result<User>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    /// Merges the provided fields; `None` keeps the stored value.
    async fn update_profile(
        &self,
        email: &str,
        name: Option<String>,
        profile_pic_url: Option<String>,
    ) -> Result<User>;
    async fn upsert_company(&self, user_id: Uuid, name: String) -> Result<Company>;
}

/// Object storage contract for binary assets.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Buffers are transferred as-is; the caller has already enforced the
    /// size limit.
    async fn upload(&self, file: UploadFile) -> Result<StoredMedia>;
    /// Issues a pre-signed PUT URL a client can transfer bytes to directly.
    async fn presign_upload(
        &self,
        file_name: &str,
        content_type: &mime::Mime,
        expires_in: Duration,
    ) -> Result<String>;
    /// Compensating action: removes a previously uploaded object.
    async fn remove(&self, url: &str) -> Result<()>;
}

/// Maps an inbound bearer token to the acting user.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// `Ok(None)` for expired, garbled, or unknown tokens, never an error.
    async fn resolve(&self, token: &str) -> Result<Option<User>>;
}

/// Password hashing contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Mints the bearer token a successful login hands back.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: &User) -> Result<String>;
}
