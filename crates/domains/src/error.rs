//! # Error
//!
//! Centralized error handling for the marketplace core.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Resource absent or not owned by the acting user. Ownership failures
    /// are deliberately indistinguishable from absence.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Validation failure (missing field, bad rate, too many images, ...)
    #[error("validation error: {0}")]
    Validation(String),

    /// No resolved identity, or credentials that do not check out.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Resource already exists (e.g. duplicate account email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Input format the platform does not accept (e.g. video extension).
    #[error("unsupported media: {0}")]
    UnsupportedMedia(String),

    /// Infrastructure failure (database down, object storage unreachable).
    /// The underlying cause is logged, never surfaced to the caller.
    #[error("internal service error: {0}")]
    Internal(String),
}

/// A specialized Result type for marketplace logic.
pub type Result<T> = std::result::Result<T, Error>;
