//! # domains
//!
//! The central entities and port definitions for the adbazaar marketplace.

pub mod error;
pub mod media;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use error::*;
pub use media::*;
pub use models::*;
pub use ports::*;
