//! # Domain Models
//!
//! These structs represent the core entities of the marketplace: publishers
//! ("owners") list ad boards, advertisers book creatives against them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Maximum number of image URLs a board may carry.
pub const MAX_BOARD_IMAGES: usize = 7;

/// The physical/display technology of an ad board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardType {
    Static,
    Digital,
    #[serde(rename = "Moving Digital")]
    MovingDigital,
}

impl BoardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardType::Static => "Static",
            BoardType::Digital => "Digital",
            BoardType::MovingDigital => "Moving Digital",
        }
    }

    /// Parses the wire/database representation.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "Static" => Ok(BoardType::Static),
            "Digital" => Ok(BoardType::Digital),
            "Moving Digital" => Ok(BoardType::MovingDigital),
            other => Err(Error::Validation(format!("unknown board type `{other}`"))),
        }
    }
}

/// A bookable physical or digital display slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdBoard {
    pub id: Uuid,
    pub board_name: String,
    pub location: String,
    pub description: Option<String>,
    pub board_type: BoardType,
    /// Rate charged per display day. Always > 0.
    pub daily_rate: f64,
    pub operational_hours: String,
    /// 10-digit contact number of the board owner.
    pub owner_contact: String,
    pub dimensions: String,
    pub is_available: bool,
    /// Bounded at [`MAX_BOARD_IMAGES`] entries.
    pub image_urls: Vec<String>,
    /// Immutable after creation.
    pub created_by: Uuid,
    pub last_maintenance_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A piece of creative content ("creative") an advertiser wants displayed.
///
/// Exactly one of `download_link` / `video_url` is the canonical playable
/// asset; `video_url` wins when both are set. The display window lives on the
/// [`Booking`], not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ad {
    pub id: Uuid,
    pub title: String,
    pub download_link: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: String,
    /// Playback duration in seconds. Always > 0.
    pub duration_secs: i32,
    pub remarks: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ad {
    /// The asset a display player would actually fetch.
    pub fn playable_asset(&self) -> Option<&str> {
        self.video_url.as_deref().or(self.download_link.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "Pending" => Ok(BookingStatus::Pending),
            "Confirmed" => Ok(BookingStatus::Confirmed),
            "Cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(Error::Validation(format!("unknown booking status `{other}`"))),
        }
    }
}

/// Associates an [`Ad`] with an [`AdBoard`] over a date interval.
///
/// Both ends of the interval are normalized to UTC midnight so overlap
/// comparisons are date-granular. Invariant: `start_date <= end_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub ad_id: Uuid,
    pub ad_board_id: Uuid,
    pub booked_by: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Inclusive interval overlap against a query window.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_date <= end && self.end_date >= start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Owner,
    Advertiser,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "Owner",
            Role::Advertiser => "Advertiser",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "Owner" => Ok(Role::Owner),
            "Advertiser" => Ok(Role::Advertiser),
            other => Err(Error::Validation(format!("unknown role `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
}

/// An authenticated account. `password_hash` is absent for OAuth accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub profile_pic_url: Option<String>,
    pub role: Role,
    pub company: Option<Company>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A booked creative joined with its booking and the board it occupies:
/// the aggregate the schedule screens consume.
#[derive(Debug, Clone, Serialize)]
pub struct Placement {
    pub ad: Ad,
    pub booking: Booking,
    pub board: AdBoard,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn board_type_round_trips() {
        for t in [BoardType::Static, BoardType::Digital, BoardType::MovingDigital] {
            assert_eq!(BoardType::parse(t.as_str()).unwrap(), t);
        }
        assert!(BoardType::parse("Holographic").is_err());
    }

    #[test]
    fn overlap_is_inclusive_on_both_ends() {
        let booking = Booking {
            id: Uuid::new_v4(),
            ad_id: Uuid::new_v4(),
            ad_board_id: Uuid::new_v4(),
            booked_by: Uuid::new_v4(),
            start_date: day(1),
            end_date: day(10),
            status: BookingStatus::Confirmed,
            created_at: day(1),
            updated_at: day(1),
        };
        assert!(booking.overlaps(day(10), day(12)));
        assert!(booking.overlaps(day(5), day(5)));
        assert!(!booking.overlaps(day(11), day(12)));
    }

    #[test]
    fn video_url_wins_over_download_link() {
        let ad = Ad {
            id: Uuid::new_v4(),
            title: "Diwali Promo".into(),
            download_link: Some("https://cdn.example/promo.zip".into()),
            video_url: Some("https://cdn.example/promo.mp4".into()),
            thumbnail_url: "https://cdn.example/thumb.jpg".into(),
            duration_secs: 30,
            remarks: None,
            created_by: Uuid::new_v4(),
            created_at: day(1),
            updated_at: day(1),
        };
        assert_eq!(ad.playable_asset(), Some("https://cdn.example/promo.mp4"));
    }
}
