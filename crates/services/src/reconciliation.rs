//! # Booking Reconciliation
//!
//! Computes which creatives occupy which boards for a given window, scoped
//! to the boards the requesting owner actually holds.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use domains::{Ad, AdBoard, AdBoardRepository, AdRepository, BookingRepository, Placement, Result, User};
use uuid::Uuid;

use crate::commands::DateWindow;

pub struct ReconciliationService {
    boards: Arc<dyn AdBoardRepository>,
    ads: Arc<dyn AdRepository>,
    bookings: Arc<dyn BookingRepository>,
}

impl ReconciliationService {
    pub fn new(
        boards: Arc<dyn AdBoardRepository>,
        ads: Arc<dyn AdRepository>,
        bookings: Arc<dyn BookingRepository>,
    ) -> Self {
        Self { boards, ads, bookings }
    }

    /// Placements visible to `owner` within `window`.
    ///
    /// Bookings overlapping the window (inclusive on both ends) are joined
    /// against the owner's boards; a booking whose board belongs to someone
    /// else is dropped, and one whose board or ad has since been deleted is
    /// silently skipped rather than surfaced as an error. Output order is
    /// whatever the storage adapter returned.
    pub async fn placements(&self, window: DateWindow, owner: &User) -> Result<Vec<Placement>> {
        let (start, end) = window.resolve(Utc::now().date_naive());

        let (bookings, boards) = tokio::try_join!(
            self.bookings.list_overlapping(start, end),
            self.boards.list_by_owner(owner.id),
        )?;

        let board_index: HashMap<Uuid, AdBoard> =
            boards.into_iter().map(|b| (b.id, b)).collect();

        let ad_ids: Vec<Uuid> = bookings
            .iter()
            .filter(|b| board_index.contains_key(&b.ad_board_id))
            .map(|b| b.ad_id)
            .collect();
        let ad_index: HashMap<Uuid, Ad> = self
            .ads
            .find_many(&ad_ids)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        let candidates = bookings.len();
        let placements: Vec<Placement> = bookings
            .into_iter()
            .filter_map(|booking| {
                let board = board_index.get(&booking.ad_board_id)?.clone();
                let ad = ad_index.get(&booking.ad_id)?.clone();
                Some(Placement { ad, booking, board })
            })
            .collect();
        tracing::debug!(
            owner = %owner.id,
            candidates,
            placements = placements.len(),
            "reconciled booking window"
        );

        Ok(placements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};
    use domains::{
        BoardType, Booking, BookingStatus, MockAdBoardRepository, MockAdRepository,
        MockBookingRepository, Role,
    };

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, d, 0, 0, 0).unwrap()
    }

    fn owner(id: Uuid) -> User {
        User {
            id,
            name: "Publisher".into(),
            email: "owner@example.com".into(),
            password_hash: None,
            profile_pic_url: None,
            role: Role::Owner,
            company: None,
            created_at: day(1),
            updated_at: day(1),
        }
    }

    fn board(id: Uuid, created_by: Uuid) -> AdBoard {
        AdBoard {
            id,
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
            created_by,
            last_maintenance_at: day(1),
            created_at: day(1),
            updated_at: day(1),
        }
    }

    fn ad(id: Uuid) -> Ad {
        Ad {
            id,
            title: "Diwali Promo".into(),
            download_link: None,
            video_url: Some("https://cdn.example/promo.mp4".into()),
            thumbnail_url: "https://cdn.example/thumb.jpg".into(),
            duration_secs: 30,
            remarks: None,
            created_by: Uuid::new_v4(),
            created_at: day(1),
            updated_at: day(1),
        }
    }

    fn booking(ad_id: Uuid, board_id: Uuid) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            ad_id,
            ad_board_id: board_id,
            booked_by: Uuid::new_v4(),
            start_date: day(1),
            end_date: day(10),
            status: BookingStatus::Confirmed,
            created_at: day(1),
            updated_at: day(1),
        }
    }

    #[tokio::test]
    async fn foreign_boards_are_excluded_from_the_join() {
        let owner_id = Uuid::new_v4();
        let own_board = board(Uuid::new_v4(), owner_id);
        let own_board_id = own_board.id;
        let foreign_board_id = Uuid::new_v4();

        let own_ad = ad(Uuid::new_v4());
        let own_ad_id = own_ad.id;
        let foreign_ad_id = Uuid::new_v4();

        let mut bookings = MockBookingRepository::new();
        let rows = vec![booking(own_ad_id, own_board_id), booking(foreign_ad_id, foreign_board_id)];
        bookings
            .expect_list_overlapping()
            .returning(move |_, _| Ok(rows.clone()));

        let mut boards = MockAdBoardRepository::new();
        let owned = vec![own_board];
        boards
            .expect_list_by_owner()
            .returning(move |_| Ok(owned.clone()));

        let mut ads = MockAdRepository::new();
        let found = vec![own_ad];
        ads.expect_find_many()
            .withf(move |ids| ids.len() == 1 && ids[0] == own_ad_id)
            .returning(move |_| Ok(found.clone()));

        let svc = ReconciliationService::new(Arc::new(boards), Arc::new(ads), Arc::new(bookings));
        let placements = svc.placements(DateWindow::default(), &owner(owner_id)).await.unwrap();

        assert_eq!(placements.len(), 1);
        assert_eq!(placements[0].board.id, own_board_id);
        assert_eq!(placements[0].ad.id, own_ad_id);
    }

    #[tokio::test]
    async fn orphaned_bookings_are_silently_skipped() {
        let owner_id = Uuid::new_v4();
        let own_board = board(Uuid::new_v4(), owner_id);
        let own_board_id = own_board.id;
        let vanished_ad_id = Uuid::new_v4();

        let mut bookings = MockBookingRepository::new();
        let rows = vec![booking(vanished_ad_id, own_board_id)];
        bookings
            .expect_list_overlapping()
            .returning(move |_, _| Ok(rows.clone()));

        let mut boards = MockAdBoardRepository::new();
        let owned = vec![own_board];
        boards
            .expect_list_by_owner()
            .returning(move |_| Ok(owned.clone()));

        let mut ads = MockAdRepository::new();
        ads.expect_find_many().returning(|_| Ok(vec![]));

        let svc = ReconciliationService::new(Arc::new(boards), Arc::new(ads), Arc::new(bookings));
        let placements = svc.placements(DateWindow::default(), &owner(owner_id)).await.unwrap();

        assert!(placements.is_empty());
    }

    #[tokio::test]
    async fn storage_failure_propagates_without_partial_results() {
        let mut bookings = MockBookingRepository::new();
        bookings
            .expect_list_overlapping()
            .returning(|_, _| Err(domains::Error::Internal("db down".into())));

        let mut boards = MockAdBoardRepository::new();
        boards.expect_list_by_owner().returning(|_| Ok(vec![]));

        let ads = MockAdRepository::new();

        let svc = ReconciliationService::new(Arc::new(boards), Arc::new(ads), Arc::new(bookings));
        let err = svc
            .placements(DateWindow::default(), &owner(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, domains::Error::Internal(_)));
    }
}
