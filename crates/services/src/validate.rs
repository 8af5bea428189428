//! # Validation
//!
//! Field-level checks shared by the mutation services. All of these run
//! synchronously before any side effect.

use domains::{Error, Result, UploadFile, MAX_BOARD_IMAGES, MAX_UPLOAD_BYTES};

/// Rejects empty or whitespace-only required fields.
pub fn required(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("missing required field `{field}`")));
    }
    Ok(())
}

pub fn positive_rate(rate: f64) -> Result<()> {
    if !(rate > 0.0) {
        return Err(Error::Validation("daily rate must be greater than zero".into()));
    }
    Ok(())
}

pub fn positive_duration(secs: i32) -> Result<()> {
    if secs <= 0 {
        return Err(Error::Validation("ad duration must be a positive number of seconds".into()));
    }
    Ok(())
}

/// Owner contact numbers are plain 10-digit strings.
pub fn contact_number(contact: &str) -> Result<()> {
    if contact.len() != 10 || !contact.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Validation("owner contact must be a 10-digit number".into()));
    }
    Ok(())
}

/// Caps the combined image count for a board.
pub fn image_count(total: usize) -> Result<()> {
    if total > MAX_BOARD_IMAGES {
        return Err(Error::Validation(format!(
            "a board may carry at most {MAX_BOARD_IMAGES} images, got {total}"
        )));
    }
    Ok(())
}

/// Rejects oversized files before any network transfer happens.
pub fn upload_size(file: &UploadFile, what: &str) -> Result<()> {
    if file.exceeds_limit() {
        return Err(Error::Validation(format!(
            "{what} must be less than {} MB",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn file_of(len: usize) -> UploadFile {
        UploadFile {
            file_name: "pic.jpg".into(),
            content_type: mime::IMAGE_JPEG,
            bytes: Bytes::from(vec![0u8; len]),
        }
    }

    #[test]
    fn contact_must_be_ten_digits() {
        assert!(contact_number("9876543210").is_ok());
        assert!(contact_number("98765").is_err());
        assert!(contact_number("987654321x").is_err());
        assert!(contact_number("98765432100").is_err());
    }

    #[test]
    fn rate_must_be_strictly_positive() {
        assert!(positive_rate(1500.0).is_ok());
        assert!(positive_rate(0.0).is_err());
        assert!(positive_rate(-1.0).is_err());
        assert!(positive_rate(f64::NAN).is_err());
    }

    #[test]
    fn five_megabytes_is_the_inclusive_limit() {
        assert!(upload_size(&file_of(MAX_UPLOAD_BYTES), "thumbnail").is_ok());
        assert!(upload_size(&file_of(MAX_UPLOAD_BYTES + 1), "thumbnail").is_err());
    }

    #[test]
    fn image_count_caps_at_seven() {
        assert!(image_count(7).is_ok());
        assert!(image_count(8).is_err());
    }
}
