//! Multipart form parsing.
//!
//! Each endpoint's form is read field-by-field into a typed command before
//! any business logic runs. A scalar field that appears twice, a number that
//! does not parse, or a date in the wrong shape rejects the request; there
//! is no silent array-or-scalar coercion.

use axum::extract::multipart::{Field, Multipart};
use bytes::Bytes;
use chrono::{DateTime, NaiveDate};
use domains::{BoardType, UploadFile};
use mime::Mime;
use uuid::Uuid;

use crate::error::ApiError;
use services::commands::{CreateAdBoard, CreateCreative, UpdateAdBoard, UpdateProfile};

/// Enough headroom for seven five-megabyte images plus the scalar fields.
pub const MAX_MULTIPART_BYTES: usize = 48 * 1024 * 1024;

/// Dates arrive either as plain `YYYY-MM-DD` or as an RFC 3339 timestamp,
/// in which case only the calendar day is kept.
pub fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, ApiError> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .map_err(|_| ApiError::bad_request(format!("`{field}` is not a valid date")))
}

fn duplicate(field: &str) -> ApiError {
    ApiError::bad_request(format!("field `{field}` appears more than once"))
}

fn missing(field: &str) -> ApiError {
    ApiError::bad_request(format!("missing required field `{field}`"))
}

async fn text_value(field: Field<'_>, name: &str) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|_| ApiError::bad_request(format!("field `{name}` is not valid text")))
}

/// Reads a file part, deriving the content type from the part header or,
/// failing that, from the file name.
async fn file_value(field: Field<'_>, name: &str) -> Result<UploadFile, ApiError> {
    let file_name = field
        .file_name()
        .map(str::to_owned)
        .ok_or_else(|| ApiError::bad_request(format!("field `{name}` must be a file")))?;

    let content_type = field
        .content_type()
        .and_then(|ct| ct.parse::<Mime>().ok())
        .unwrap_or_else(|| mime_guess::from_path(&file_name).first_or_octet_stream());

    let bytes: Bytes = field
        .bytes()
        .await
        .map_err(|_| ApiError::bad_request(format!("failed to read file field `{name}`")))?;

    Ok(UploadFile { file_name, content_type, bytes })
}

fn set_once<T>(slot: &mut Option<T>, value: T, name: &str) -> Result<(), ApiError> {
    if slot.is_some() {
        return Err(duplicate(name));
    }
    *slot = Some(value);
    Ok(())
}

fn next_field_error(_: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::bad_request("malformed multipart body")
}

pub async fn ad_board_create(mut multipart: Multipart) -> Result<CreateAdBoard, ApiError> {
    let mut board_name = None;
    let mut location = None;
    let mut description = None;
    let mut daily_rate = None;
    let mut owner_contact = None;
    let mut board_type = None;
    let mut image_urls = Vec::new();
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(next_field_error)? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "boardName" => {
                let value = text_value(field, &name).await?;
                set_once(&mut board_name, value, &name)?;
            }
            "location" => {
                let value = text_value(field, &name).await?;
                set_once(&mut location, value, &name)?;
            }
            "description" => {
                let value = text_value(field, &name).await?;
                set_once(&mut description, value, &name)?;
            }
            "dailyRate" => {
                let raw = text_value(field, &name).await?;
                let rate: f64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::bad_request("`dailyRate` is not a number"))?;
                set_once(&mut daily_rate, rate, &name)?;
            }
            "ownerContact" => {
                let value = text_value(field, &name).await?;
                set_once(&mut owner_contact, value, &name)?;
            }
            "boardType" => {
                let raw = text_value(field, &name).await?;
                set_once(&mut board_type, BoardType::parse(&raw)?, &name)?;
            }
            "imageUrls" => image_urls.push(text_value(field, &name).await?),
            "image" => images.push(file_value(field, &name).await?),
            _ => {} // unknown parts are dropped, not coerced
        }
    }

    Ok(CreateAdBoard {
        board_name: board_name.ok_or_else(|| missing("boardName"))?,
        location: location.ok_or_else(|| missing("location"))?,
        description,
        daily_rate: daily_rate.ok_or_else(|| missing("dailyRate"))?,
        owner_contact: owner_contact.ok_or_else(|| missing("ownerContact"))?,
        board_type: board_type.ok_or_else(|| missing("boardType"))?,
        image_urls,
        images,
    })
}

pub async fn ad_board_update(mut multipart: Multipart) -> Result<UpdateAdBoard, ApiError> {
    let mut id = None;
    let mut board_name = None;
    let mut location = None;
    let mut description = None;
    let mut daily_rate = None;
    let mut owner_contact = None;
    let mut board_type = None;
    let mut retained_image_urls = Vec::new();
    let mut new_images = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(next_field_error)? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "id" => {
                let raw = text_value(field, &name).await?;
                let parsed = Uuid::parse_str(raw.trim())
                    .map_err(|_| ApiError::bad_request("`id` is not a valid identifier"))?;
                set_once(&mut id, parsed, &name)?;
            }
            "boardName" => {
                let value = text_value(field, &name).await?;
                set_once(&mut board_name, value, &name)?;
            }
            "location" => {
                let value = text_value(field, &name).await?;
                set_once(&mut location, value, &name)?;
            }
            "description" => {
                let value = text_value(field, &name).await?;
                set_once(&mut description, value, &name)?;
            }
            "dailyRate" => {
                let raw = text_value(field, &name).await?;
                let rate: f64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::bad_request("`dailyRate` is not a number"))?;
                set_once(&mut daily_rate, rate, &name)?;
            }
            "ownerContact" => {
                let value = text_value(field, &name).await?;
                set_once(&mut owner_contact, value, &name)?;
            }
            "boardType" => {
                let raw = text_value(field, &name).await?;
                set_once(&mut board_type, BoardType::parse(&raw)?, &name)?;
            }
            "imageUrls" => retained_image_urls.push(text_value(field, &name).await?),
            "image" => new_images.push(file_value(field, &name).await?),
            _ => {}
        }
    }

    Ok(UpdateAdBoard {
        id: id.ok_or_else(|| missing("id"))?,
        board_name: board_name.ok_or_else(|| missing("boardName"))?,
        location: location.ok_or_else(|| missing("location"))?,
        description,
        daily_rate: daily_rate.ok_or_else(|| missing("dailyRate"))?,
        owner_contact: owner_contact.ok_or_else(|| missing("ownerContact"))?,
        board_type: board_type.ok_or_else(|| missing("boardType"))?,
        retained_image_urls,
        new_images,
    })
}

pub async fn creative_create(mut multipart: Multipart) -> Result<CreateCreative, ApiError> {
    let mut title = None;
    let mut download_link = None;
    let mut video_url = None;
    let mut ad_board_id = None;
    let mut display_start = None;
    let mut display_end = None;
    let mut duration_secs = None;
    let mut remarks = None;
    let mut thumbnail = None;

    while let Some(field) = multipart.next_field().await.map_err(next_field_error)? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "title" => {
                let value = text_value(field, &name).await?;
                set_once(&mut title, value, &name)?;
            }
            "downloadLink" => {
                let value = text_value(field, &name).await?;
                set_once(&mut download_link, value, &name)?;
            }
            "videoUrl" => {
                let value = text_value(field, &name).await?;
                set_once(&mut video_url, value, &name)?;
            }
            "adBoardId" => {
                let raw = text_value(field, &name).await?;
                let parsed = Uuid::parse_str(raw.trim())
                    .map_err(|_| ApiError::bad_request("`adBoardId` is not a valid identifier"))?;
                set_once(&mut ad_board_id, parsed, &name)?;
            }
            "adDisplayStartDate" => {
                let raw = text_value(field, &name).await?;
                set_once(&mut display_start, parse_date(&raw, "adDisplayStartDate")?, &name)?;
            }
            "adDisplayEndDate" => {
                let raw = text_value(field, &name).await?;
                set_once(&mut display_end, parse_date(&raw, "adDisplayEndDate")?, &name)?;
            }
            "adDuration" => {
                let raw = text_value(field, &name).await?;
                let secs: i32 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::bad_request("`adDuration` is not a whole number"))?;
                set_once(&mut duration_secs, secs, &name)?;
            }
            "remarks" => {
                let value = text_value(field, &name).await?;
                set_once(&mut remarks, value, &name)?;
            }
            "thumbnail" => {
                let value = file_value(field, &name).await?;
                set_once(&mut thumbnail, value, &name)?;
            }
            _ => {}
        }
    }

    Ok(CreateCreative {
        title: title.ok_or_else(|| missing("title"))?,
        download_link,
        video_url,
        ad_board_id: ad_board_id.ok_or_else(|| missing("adBoardId"))?,
        display_start: display_start.ok_or_else(|| missing("adDisplayStartDate"))?,
        display_end: display_end.ok_or_else(|| missing("adDisplayEndDate"))?,
        duration_secs: duration_secs.ok_or_else(|| missing("adDuration"))?,
        remarks,
        thumbnail: thumbnail.ok_or_else(|| missing("thumbnail"))?,
    })
}

pub async fn profile_update(mut multipart: Multipart) -> Result<UpdateProfile, ApiError> {
    let mut name_field = None;
    let mut company_name = None;
    let mut profile_pic = None;

    while let Some(field) = multipart.next_field().await.map_err(next_field_error)? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "name" => {
                let value = text_value(field, &name).await?;
                set_once(&mut name_field, value, &name)?;
            }
            "companyName" => {
                let value = text_value(field, &name).await?;
                set_once(&mut company_name, value, &name)?;
            }
            "profilePic" => {
                let value = file_value(field, &name).await?;
                set_once(&mut profile_pic, value, &name)?;
            }
            _ => {}
        }
    }

    Ok(UpdateProfile { name: name_field, company_name, profile_pic })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_rfc3339_dates_both_parse() {
        let plain = parse_date("2024-10-05", "adDisplayStartDate").unwrap();
        let stamped = parse_date("2024-10-05T18:30:00+05:30", "adDisplayStartDate").unwrap();
        assert_eq!(plain, NaiveDate::from_ymd_opt(2024, 10, 5).unwrap());
        assert_eq!(stamped, plain);
    }

    #[test]
    fn garbage_dates_are_rejected() {
        assert!(parse_date("05/10/2024", "adDisplayStartDate").is_err());
        assert!(parse_date("today", "adDisplayStartDate").is_err());
    }
}
