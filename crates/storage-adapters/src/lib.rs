//! # storage-adapters
//!
//! Concrete implementations of the `domains` persistence and media ports.
//! Postgres and S3 back the real deployment; the in-memory adapter backs the
//! integration tests and local experiments.

pub mod memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;

#[cfg(feature = "media-s3")]
pub mod s3;

#[cfg(feature = "media-local")]
pub mod local;
