//! # Commands
//!
//! Strongly typed inputs to the mutation services. The HTTP layer parses
//! multipart/JSON bodies into these before any business logic runs; a
//! structural violation is rejected there, never coerced.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use domains::{BoardType, Role, UploadFile};
use uuid::Uuid;

/// Truncates a date to UTC midnight so interval comparisons are
/// date-granular rather than time-granular.
pub fn utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// A half-specified query window; unspecified ends default to today.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    /// Resolves both ends against `today`, normalized to UTC midnight.
    pub fn resolve(&self, today: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            utc_midnight(self.start.unwrap_or(today)),
            utc_midnight(self.end.unwrap_or(today)),
        )
    }
}

#[derive(Debug)]
pub struct CreateAdBoard {
    pub board_name: String,
    pub location: String,
    pub description: Option<String>,
    pub daily_rate: f64,
    pub owner_contact: String,
    pub board_type: BoardType,
    /// Pre-existing URLs to carry over, e.g. assets hosted elsewhere.
    pub image_urls: Vec<String>,
    pub images: Vec<UploadFile>,
}

#[derive(Debug)]
pub struct UpdateAdBoard {
    pub id: Uuid,
    pub board_name: String,
    pub location: String,
    pub description: Option<String>,
    pub daily_rate: f64,
    pub owner_contact: String,
    pub board_type: BoardType,
    /// URLs the caller chose to retain from the stored record.
    pub retained_image_urls: Vec<String>,
    pub new_images: Vec<UploadFile>,
}

#[derive(Debug)]
pub struct CreateCreative {
    pub title: String,
    pub download_link: Option<String>,
    pub video_url: Option<String>,
    pub ad_board_id: Uuid,
    pub display_start: NaiveDate,
    pub display_end: NaiveDate,
    pub duration_secs: i32,
    pub remarks: Option<String>,
    pub thumbnail: UploadFile,
}

#[derive(Debug)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub company_name: Option<String>,
}

#[derive(Debug)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub company_name: Option<String>,
    pub profile_pic: Option<UploadFile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_defaults_both_ends_to_today() {
        let today = NaiveDate::from_ymd_opt(2024, 10, 5).unwrap();
        let (start, end) = DateWindow::default().resolve(today);
        assert_eq!(start, utc_midnight(today));
        assert_eq!(end, utc_midnight(today));
    }

    #[test]
    fn midnight_normalization_drops_time_of_day() {
        let date = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
        let midnight = utc_midnight(date);
        assert_eq!(midnight.to_rfc3339(), "2024-10-01T00:00:00+00:00");
    }
}
