//! # auth-adapters
//!
//! Credential hashing and bearer-token identity for the marketplace.

pub mod credentials;

#[cfg(feature = "auth-jwt")]
pub mod jwt;

pub use credentials::Argon2CredentialHasher;

#[cfg(feature = "auth-jwt")]
pub use jwt::{JwtIdentityResolver, JwtTokenIssuer};
