//! # In-Memory Adapter
//!
//! Dashmap-backed implementations of every port. Listing operations return
//! rows in insertion order, which is the ordering contract (or lack of one)
//! the callers are written against.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use domains::{
    Ad, AdBoard, AdBoardRepository, AdRepository, Booking, BookingRepository, Company, Error,
    MediaStorage, Result, StoredMedia, UploadFile, User, UserRepository,
};
use uuid::Uuid;

/// Wraps each row with an insertion sequence so listings stay ordered.
#[derive(Debug, Clone)]
struct Row<T> {
    seq: u64,
    value: T,
}

fn ordered<T: Clone>(map: &DashMap<Uuid, Row<T>>) -> Vec<T> {
    let mut rows: Vec<Row<T>> = map.iter().map(|r| r.value().clone()).collect();
    rows.sort_by_key(|r| r.seq);
    rows.into_iter().map(|r| r.value).collect()
}

#[derive(Default)]
pub struct MemoryAdBoardRepository {
    rows: DashMap<Uuid, Row<AdBoard>>,
    seq: AtomicU64,
}

impl MemoryAdBoardRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdBoardRepository for MemoryAdBoardRepository {
    async fn insert(&self, board: AdBoard) -> Result<AdBoard> {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.rows.insert(board.id, Row { seq, value: board.clone() });
        Ok(board)
    }

    async fn find(&self, id: Uuid) -> Result<Option<AdBoard>> {
        Ok(self.rows.get(&id).map(|r| r.value().value.clone()))
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<AdBoard>> {
        Ok(ordered(&self.rows)
            .into_iter()
            .filter(|b| b.created_by == owner)
            .collect())
    }

    async fn update(&self, board: AdBoard) -> Result<AdBoard> {
        let mut entry = self
            .rows
            .get_mut(&board.id)
            .ok_or(Error::NotFound("ad board"))?;
        entry.value = board.clone();
        Ok(board)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.rows.remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryAdRepository {
    rows: DashMap<Uuid, Row<Ad>>,
    seq: AtomicU64,
}

impl MemoryAdRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdRepository for MemoryAdRepository {
    async fn insert(&self, ad: Ad) -> Result<Ad> {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.rows.insert(ad.id, Row { seq, value: ad.clone() });
        Ok(ad)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Ad>> {
        Ok(self.rows.get(&id).map(|r| r.value().value.clone()))
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Ad>> {
        Ok(ordered(&self.rows)
            .into_iter()
            .filter(|a| ids.contains(&a.id))
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.rows.remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryBookingRepository {
    rows: DashMap<Uuid, Row<Booking>>,
    seq: AtomicU64,
}

impl MemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for MemoryBookingRepository {
    async fn insert(&self, booking: Booking) -> Result<Booking> {
        if booking.start_date > booking.end_date {
            return Err(Error::Validation(
                "booking start date must not be after the end date".into(),
            ));
        }
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.rows.insert(booking.id, Row { seq, value: booking.clone() });
        Ok(booking)
    }

    async fn list_overlapping(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Booking>> {
        Ok(ordered(&self.rows)
            .into_iter()
            .filter(|b| b.overlaps(start, end))
            .collect())
    }

    async fn find_by_ad(&self, ad_id: Uuid) -> Result<Vec<Booking>> {
        Ok(ordered(&self.rows)
            .into_iter()
            .filter(|b| b.ad_id == ad_id)
            .collect())
    }

    async fn reschedule(
        &self,
        ad_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<()> {
        if start > end {
            return Err(Error::Validation(
                "booking start date must not be after the end date".into(),
            ));
        }
        for mut entry in self.rows.iter_mut() {
            if entry.value.ad_id == ad_id {
                entry.value.start_date = start;
                entry.value.end_date = end;
                entry.value.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn delete_by_ad(&self, ad_id: Uuid) -> Result<()> {
        self.rows.retain(|_, row| row.value.ad_id != ad_id);
        Ok(())
    }

    async fn delete_by_board(&self, board_id: Uuid) -> Result<()> {
        self.rows.retain(|_, row| row.value.ad_board_id != board_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    rows: DashMap<Uuid, Row<User>>,
    companies: DashMap<Uuid, Company>,
    seq: AtomicU64,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_company(&self, mut user: User) -> User {
        user.company = self.companies.get(&user.id).map(|c| c.value().clone());
        user
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: User) -> Result<User> {
        let duplicate = self
            .rows
            .iter()
            .any(|r| r.value().value.email == user.email);
        if duplicate {
            return Err(Error::Conflict("email already in use".into()));
        }
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.rows.insert(user.id, Row { seq, value: user.clone() });
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .rows
            .iter()
            .find(|r| r.value().value.email == email)
            .map(|r| self.with_company(r.value().value.clone())))
    }

    async fn update_profile(
        &self,
        email: &str,
        name: Option<String>,
        profile_pic_url: Option<String>,
    ) -> Result<User> {
        for mut entry in self.rows.iter_mut() {
            if entry.value.email == email {
                if let Some(name) = name {
                    entry.value.name = name;
                }
                if let Some(url) = profile_pic_url {
                    entry.value.profile_pic_url = Some(url);
                }
                entry.value.updated_at = Utc::now();
                let updated = entry.value.clone();
                drop(entry);
                return Ok(self.with_company(updated));
            }
        }
        Err(Error::NotFound("user"))
    }

    async fn upsert_company(&self, user_id: Uuid, name: String) -> Result<Company> {
        let company = self
            .companies
            .entry(user_id)
            .and_modify(|c| c.name = name.clone())
            .or_insert_with(|| Company { id: Uuid::new_v4(), name: name.clone(), user_id })
            .clone();
        Ok(company)
    }
}

/// Records every upload so tests can assert what did (or did not) reach
/// object storage.
#[derive(Default)]
pub struct MemoryMediaStorage {
    objects: DashMap<String, UploadFile>,
}

impl MemoryMediaStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.objects.contains_key(url)
    }
}

#[async_trait]
impl MediaStorage for MemoryMediaStorage {
    async fn upload(&self, file: UploadFile) -> Result<StoredMedia> {
        let url = format!("memory://media/{}/{}", Uuid::new_v4(), file.file_name);
        self.objects.insert(url.clone(), file);
        Ok(StoredMedia { url })
    }

    async fn presign_upload(
        &self,
        file_name: &str,
        content_type: &mime::Mime,
        expires_in: Duration,
    ) -> Result<String> {
        Ok(format!(
            "memory://presigned/{file_name}?content-type={content_type}&expires={}",
            expires_in.as_secs()
        ))
    }

    async fn remove(&self, url: &str) -> Result<()> {
        self.objects.remove(url);
        Ok(())
    }
}
