//! # Credential Hashing
//!
//! Argon2id password hashing behind the `CredentialHasher` port.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};
use domains::{CredentialHasher, Error, Result};

#[derive(Default)]
pub struct Argon2CredentialHasher;

impl Argon2CredentialHasher {
    pub fn new() -> Self {
        Self
    }
}

impl CredentialHasher for Argon2CredentialHasher {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| {
                tracing::error!(%err, "password hashing failed");
                Error::Internal("failed to hash password".into())
            })
    }

    /// A malformed stored hash verifies as false rather than erroring;
    /// login treats both the same way.
    fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hasher = Argon2CredentialHasher::new();
        let hash = hasher.hash("hunter2hunter2").unwrap();

        assert!(hasher.verify("hunter2hunter2", &hash));
        assert!(!hasher.verify("something-else", &hash));
        assert!(!hasher.verify("hunter2hunter2", "not-a-phc-string"));
    }
}
