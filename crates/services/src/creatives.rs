//! # Creative Mutation
//!
//! Creating a creative persists the Ad and its Booking in one flow; deleting
//! removes the dependent bookings first. The thumbnail upload is compensated
//! when a later persistence step fails.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use domains::{
    Ad, AdRepository, AdBoardRepository, Booking, BookingRepository, BookingStatus, Error,
    MediaStorage, Result, User,
};
use uuid::Uuid;

use crate::commands::{utc_midnight, CreateCreative};
use crate::validate;

pub struct CreativeService {
    ads: Arc<dyn AdRepository>,
    boards: Arc<dyn AdBoardRepository>,
    bookings: Arc<dyn BookingRepository>,
    media: Arc<dyn MediaStorage>,
}

impl CreativeService {
    pub fn new(
        ads: Arc<dyn AdRepository>,
        boards: Arc<dyn AdBoardRepository>,
        bookings: Arc<dyn BookingRepository>,
        media: Arc<dyn MediaStorage>,
    ) -> Self {
        Self { ads, boards, bookings, media }
    }

    /// Persists a new creative and its booking.
    ///
    /// When both a download link and a video URL arrive, the video URL is the
    /// canonical playable asset. Display dates are truncated to UTC midnight
    /// before they are stored.
    pub async fn create(&self, cmd: CreateCreative, actor: &User) -> Result<(Ad, Booking)> {
        validate::required(&cmd.title, "title")?;
        validate::positive_duration(cmd.duration_secs)?;
        validate::upload_size(&cmd.thumbnail, "thumbnail")?;
        if cmd.display_start > cmd.display_end {
            return Err(Error::Validation(
                "display start date must not be after the end date".into(),
            ));
        }

        let download_link = cmd.download_link.filter(|s| !s.trim().is_empty());
        let video_url = cmd.video_url.filter(|s| !s.trim().is_empty());
        if download_link.is_none() && video_url.is_none() {
            return Err(Error::Validation(
                "either a download link or an uploaded video is required".into(),
            ));
        }

        let board = self
            .boards
            .find(cmd.ad_board_id)
            .await?
            .ok_or(Error::NotFound("ad board"))?;

        let thumbnail = self.media.upload(cmd.thumbnail).await?;

        let now = Utc::now();
        let ad = Ad {
            id: Uuid::new_v4(),
            title: cmd.title,
            download_link,
            video_url,
            thumbnail_url: thumbnail.url.clone(),
            duration_secs: cmd.duration_secs,
            remarks: cmd.remarks,
            created_by: actor.id,
            created_at: now,
            updated_at: now,
        };

        let ad = match self.ads.insert(ad).await {
            Ok(ad) => ad,
            Err(err) => {
                self.discard_upload(&thumbnail.url).await;
                return Err(err);
            }
        };

        let booking = Booking {
            id: Uuid::new_v4(),
            ad_id: ad.id,
            ad_board_id: board.id,
            booked_by: actor.id,
            start_date: utc_midnight(cmd.display_start),
            end_date: utc_midnight(cmd.display_end),
            status: BookingStatus::Confirmed,
            created_at: now,
            updated_at: now,
        };

        match self.bookings.insert(booking).await {
            Ok(booking) => Ok((ad, booking)),
            Err(err) => {
                // Compensate in reverse order of the writes.
                if let Err(cleanup) = self.ads.delete(ad.id).await {
                    tracing::warn!(ad_id = %ad.id, %cleanup, "failed to remove ad after booking persistence failure");
                }
                self.discard_upload(&thumbnail.url).await;
                Err(err)
            }
        }
    }

    /// Removes a creative and its bookings. Only the creator may do this.
    pub async fn delete(&self, id: Uuid, actor: &User) -> Result<()> {
        self.owned_ad(id, actor).await?;
        self.bookings.delete_by_ad(id).await?;
        self.ads.delete(id).await
    }

    /// Moves a creative's display window.
    pub async fn reschedule(
        &self,
        id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        actor: &User,
    ) -> Result<()> {
        self.owned_ad(id, actor).await?;
        if start > end {
            return Err(Error::Validation(
                "display start date must not be after the end date".into(),
            ));
        }
        self.bookings
            .reschedule(id, utc_midnight(start), utc_midnight(end))
            .await
    }

    async fn owned_ad(&self, id: Uuid, actor: &User) -> Result<Ad> {
        match self.ads.find(id).await? {
            Some(ad) if ad.created_by == actor.id => Ok(ad),
            _ => Err(Error::NotFound("ad")),
        }
    }

    async fn discard_upload(&self, url: &str) {
        if let Err(err) = self.media.remove(url).await {
            tracing::warn!(%url, %err, "failed to remove uploaded thumbnail after persistence failure");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use domains::{
        AdBoard, BoardType, MockAdBoardRepository, MockAdRepository, MockBookingRepository,
        MockMediaStorage, Role, StoredMedia, UploadFile,
    };

    fn actor() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Advertiser".into(),
            email: "ads@example.com".into(),
            password_hash: None,
            profile_pic_url: None,
            role: Role::Advertiser,
            company: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn board() -> AdBoard {
        AdBoard {
            id: Uuid::new_v4(),
            board_name: "Highway 9".into(),
            location: "Pune".into(),
            description: None,
            board_type: BoardType::Static,
            daily_rate: 1500.0,
            operational_hours: "9 AM - 5 PM".into(),
            owner_contact: "9876543210".into(),
            dimensions: "10x20 ft".into(),
            is_available: true,
            image_urls: vec![],
            created_by: Uuid::new_v4(),
            last_maintenance_at: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn thumbnail() -> UploadFile {
        UploadFile {
            file_name: "thumb.jpg".into(),
            content_type: mime::IMAGE_JPEG,
            bytes: Bytes::from_static(b"jpeg bytes"),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cmd(board_id: Uuid) -> CreateCreative {
        CreateCreative {
            title: "Diwali Promo".into(),
            download_link: Some("https://cdn.example/promo.zip".into()),
            video_url: Some("https://cdn.example/promo.mp4".into()),
            ad_board_id: board_id,
            display_start: date(2024, 10, 1),
            display_end: date(2024, 10, 10),
            duration_secs: 30,
            remarks: None,
            thumbnail: thumbnail(),
        }
    }

    fn uploading_media() -> MockMediaStorage {
        let mut media = MockMediaStorage::new();
        media.expect_upload().returning(|_| {
            Ok(StoredMedia { url: "https://bucket.s3/thumb.jpg".into() })
        });
        media
    }

    #[tokio::test]
    async fn create_normalizes_dates_and_prefers_video_url() {
        let the_board = board();
        let board_id = the_board.id;

        let mut boards = MockAdBoardRepository::new();
        boards.expect_find().returning(move |_| Ok(Some(the_board.clone())));

        let mut ads = MockAdRepository::new();
        ads.expect_insert().returning(|ad| Ok(ad));

        let mut bookings = MockBookingRepository::new();
        bookings.expect_insert().returning(|b| Ok(b));

        let svc = CreativeService::new(
            Arc::new(ads),
            Arc::new(boards),
            Arc::new(bookings),
            Arc::new(uploading_media()),
        );
        let (ad, booking) = svc.create(cmd(board_id), &actor()).await.unwrap();

        assert_eq!(ad.playable_asset(), Some("https://cdn.example/promo.mp4"));
        assert_eq!(booking.start_date.to_rfc3339(), "2024-10-01T00:00:00+00:00");
        assert_eq!(booking.end_date.to_rfc3339(), "2024-10-10T00:00:00+00:00");
        assert_eq!(booking.ad_board_id, board_id);
        assert_eq!(booking.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn inverted_window_is_rejected_before_upload() {
        let mut media = MockMediaStorage::new();
        media.expect_upload().never();

        let mut command = cmd(Uuid::new_v4());
        command.display_start = date(2024, 10, 11);
        command.display_end = date(2024, 10, 1);

        let svc = CreativeService::new(
            Arc::new(MockAdRepository::new()),
            Arc::new(MockAdBoardRepository::new()),
            Arc::new(MockBookingRepository::new()),
            Arc::new(media),
        );
        let err = svc.create(command, &actor()).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn missing_playable_asset_is_rejected() {
        let mut command = cmd(Uuid::new_v4());
        command.download_link = None;
        command.video_url = Some("   ".into());

        let svc = CreativeService::new(
            Arc::new(MockAdRepository::new()),
            Arc::new(MockAdBoardRepository::new()),
            Arc::new(MockBookingRepository::new()),
            Arc::new(MockMediaStorage::new()),
        );
        assert!(svc.create(command, &actor()).await.is_err());
    }

    #[tokio::test]
    async fn unknown_board_is_not_found() {
        let mut boards = MockAdBoardRepository::new();
        boards.expect_find().returning(|_| Ok(None));

        let svc = CreativeService::new(
            Arc::new(MockAdRepository::new()),
            Arc::new(boards),
            Arc::new(MockBookingRepository::new()),
            Arc::new(MockMediaStorage::new()),
        );
        let err = svc.create(cmd(Uuid::new_v4()), &actor()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound("ad board")));
    }

    #[tokio::test]
    async fn booking_failure_unwinds_ad_and_thumbnail() {
        let the_board = board();
        let board_id = the_board.id;

        let mut boards = MockAdBoardRepository::new();
        boards.expect_find().returning(move |_| Ok(Some(the_board.clone())));

        let mut ads = MockAdRepository::new();
        ads.expect_insert().returning(|ad| Ok(ad));
        ads.expect_delete().times(1).returning(|_| Ok(()));

        let mut bookings = MockBookingRepository::new();
        bookings
            .expect_insert()
            .returning(|_| Err(Error::Internal("db down".into())));

        let mut media = uploading_media();
        media
            .expect_remove()
            .times(1)
            .withf(|url| url == "https://bucket.s3/thumb.jpg")
            .returning(|_| Ok(()));

        let svc = CreativeService::new(
            Arc::new(ads),
            Arc::new(boards),
            Arc::new(bookings),
            Arc::new(media),
        );
        assert!(svc.create(cmd(board_id), &actor()).await.is_err());
    }

    #[tokio::test]
    async fn delete_by_stranger_leaves_the_ad_alone() {
        let someone_elses = Ad {
            id: Uuid::new_v4(),
            title: "Diwali Promo".into(),
            download_link: None,
            video_url: Some("https://cdn.example/promo.mp4".into()),
            thumbnail_url: "https://cdn.example/thumb.jpg".into(),
            duration_secs: 30,
            remarks: None,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let id = someone_elses.id;

        let mut ads = MockAdRepository::new();
        ads.expect_find().returning(move |_| Ok(Some(someone_elses.clone())));
        ads.expect_delete().never();

        let mut bookings = MockBookingRepository::new();
        bookings.expect_delete_by_ad().never();

        let svc = CreativeService::new(
            Arc::new(ads),
            Arc::new(MockAdBoardRepository::new()),
            Arc::new(bookings),
            Arc::new(MockMediaStorage::new()),
        );
        let err = svc.delete(id, &actor()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound("ad")));
    }
}
