//! # Ad-Board Mutation
//!
//! Create/update/delete flows for board inventory, with ownership
//! enforcement and image-asset handling.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    AdBoard, AdBoardRepository, BookingRepository, Error, MediaStorage, Result, User,
};
use uuid::Uuid;

use crate::commands::{CreateAdBoard, UpdateAdBoard};
use crate::validate;

const DEFAULT_DIMENSIONS: &str = "10x20 ft";
const DEFAULT_OPERATIONAL_HOURS: &str = "9 AM - 5 PM";

pub struct AdBoardService {
    boards: Arc<dyn AdBoardRepository>,
    bookings: Arc<dyn BookingRepository>,
    media: Arc<dyn MediaStorage>,
}

impl AdBoardService {
    pub fn new(
        boards: Arc<dyn AdBoardRepository>,
        bookings: Arc<dyn BookingRepository>,
        media: Arc<dyn MediaStorage>,
    ) -> Self {
        Self { boards, bookings, media }
    }

    pub async fn list(&self, actor: &User) -> Result<Vec<AdBoard>> {
        self.boards.list_by_owner(actor.id).await
    }

    pub async fn create(&self, cmd: CreateAdBoard, actor: &User) -> Result<AdBoard> {
        validate::required(&cmd.board_name, "boardName")?;
        validate::required(&cmd.location, "location")?;
        validate::positive_rate(cmd.daily_rate)?;
        validate::contact_number(&cmd.owner_contact)?;
        validate::image_count(cmd.image_urls.len() + cmd.images.len())?;
        for image in &cmd.images {
            validate::upload_size(image, "each inventory image")?;
        }

        let mut image_urls = cmd.image_urls;
        let uploaded = self.upload_all(cmd.images).await?;
        image_urls.extend(uploaded.iter().cloned());

        let now = Utc::now();
        let board = AdBoard {
            id: Uuid::new_v4(),
            board_name: cmd.board_name,
            location: cmd.location,
            description: cmd.description,
            board_type: cmd.board_type,
            daily_rate: cmd.daily_rate,
            operational_hours: DEFAULT_OPERATIONAL_HOURS.into(),
            owner_contact: cmd.owner_contact,
            dimensions: DEFAULT_DIMENSIONS.into(),
            is_available: true,
            image_urls,
            created_by: actor.id,
            last_maintenance_at: now,
            created_at: now,
            updated_at: now,
        };

        match self.boards.insert(board).await {
            Ok(board) => Ok(board),
            Err(err) => {
                self.rollback_uploads(&uploaded).await;
                Err(err)
            }
        }
    }

    pub async fn update(&self, cmd: UpdateAdBoard, actor: &User) -> Result<AdBoard> {
        let existing = self.owned_board(cmd.id, actor).await?;

        validate::required(&cmd.board_name, "boardName")?;
        validate::required(&cmd.location, "location")?;
        validate::positive_rate(cmd.daily_rate)?;
        validate::contact_number(&cmd.owner_contact)?;
        validate::image_count(cmd.retained_image_urls.len() + cmd.new_images.len())?;
        for image in &cmd.new_images {
            validate::upload_size(image, "each inventory image")?;
        }

        let mut image_urls = cmd.retained_image_urls;
        let uploaded = self.upload_all(cmd.new_images).await?;
        image_urls.extend(uploaded.iter().cloned());

        let board = AdBoard {
            board_name: cmd.board_name,
            location: cmd.location,
            description: cmd.description,
            board_type: cmd.board_type,
            daily_rate: cmd.daily_rate,
            owner_contact: cmd.owner_contact,
            image_urls,
            updated_at: Utc::now(),
            ..existing
        };

        match self.boards.update(board).await {
            Ok(board) => Ok(board),
            Err(err) => {
                self.rollback_uploads(&uploaded).await;
                Err(err)
            }
        }
    }

    /// Deletes a board and its dependent bookings. The two deletes are
    /// sequential; a crash in between can leave the board without bookings
    /// but never bookings without a board.
    pub async fn delete(&self, id: Uuid, actor: &User) -> Result<()> {
        self.owned_board(id, actor).await?;
        self.bookings.delete_by_board(id).await?;
        self.boards.delete(id).await
    }

    /// A board that is absent or owned by someone else is the same failure.
    async fn owned_board(&self, id: Uuid, actor: &User) -> Result<AdBoard> {
        match self.boards.find(id).await? {
            Some(board) if board.created_by == actor.id => Ok(board),
            _ => Err(Error::NotFound("ad board")),
        }
    }

    async fn upload_all(&self, images: Vec<domains::UploadFile>) -> Result<Vec<String>> {
        let mut urls = Vec::with_capacity(images.len());
        for image in images {
            let stored = self.media.upload(image).await?;
            urls.push(stored.url);
        }
        Ok(urls)
    }

    /// Best-effort compensation for the upload-then-persist flow.
    async fn rollback_uploads(&self, urls: &[String]) {
        for url in urls {
            if let Err(err) = self.media.remove(url).await {
                tracing::warn!(%url, %err, "failed to remove uploaded image after persistence failure");
            }
        }
    }
}
