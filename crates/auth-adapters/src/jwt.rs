//! # JWT Identity
//!
//! HS256 bearer tokens. The resolver side maps an inbound token to a stored
//! account; the issuing side backs the login endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use domains::{Error, IdentityResolver, Result, TokenIssuer, User, UserRepository};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Account id.
    sub: String,
    email: String,
    exp: i64,
}

/// Issues login tokens with a fixed time-to-live.
pub struct JwtTokenIssuer {
    encoding: EncodingKey,
    ttl: Duration,
}

impl JwtTokenIssuer {
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            ttl: Duration::seconds(ttl_secs),
        }
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, user: &User) -> Result<String> {
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(|err| {
            tracing::error!(%err, "token signing failed");
            Error::Internal("failed to issue token".into())
        })
    }
}

/// Resolves `Authorization: Bearer` tokens to accounts.
///
/// Anything that does not verify (bad signature, expired, account gone)
/// resolves to `None`; only storage failures surface as errors.
pub struct JwtIdentityResolver {
    decoding: DecodingKey,
    users: Arc<dyn UserRepository>,
}

impl JwtIdentityResolver {
    pub fn new(secret: &[u8], users: Arc<dyn UserRepository>) -> Self {
        Self { decoding: DecodingKey::from_secret(secret), users }
    }
}

#[async_trait]
impl IdentityResolver for JwtIdentityResolver {
    async fn resolve(&self, token: &str) -> Result<Option<User>> {
        let claims = match decode::<Claims>(token, &self.decoding, &Validation::default()) {
            Ok(data) => data.claims,
            Err(err) => {
                tracing::debug!(%err, "rejected bearer token");
                return Ok(None);
            }
        };
        self.users.find_by_email(&claims.email).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::Role;
    use storage_adapters::memory::MemoryUserRepository;
    use uuid::Uuid;

    const SECRET: &[u8] = b"test-secret";

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Asha".into(),
            email: "asha@example.com".into(),
            password_hash: None,
            profile_pic_url: None,
            role: Role::Advertiser,
            company: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn issued_token_resolves_back_to_the_account() {
        let users = Arc::new(MemoryUserRepository::new());
        let account = user();
        users.insert(account.clone()).await.unwrap();

        let issuer = JwtTokenIssuer::new(SECRET, 3600);
        let token = issuer.issue(&account).unwrap();

        let resolver = JwtIdentityResolver::new(SECRET, users);
        let resolved = resolver.resolve(&token).await.unwrap().unwrap();
        assert_eq!(resolved.id, account.id);
    }

    #[tokio::test]
    async fn foreign_or_expired_tokens_resolve_to_none() {
        let users = Arc::new(MemoryUserRepository::new());
        let account = user();
        users.insert(account.clone()).await.unwrap();
        let resolver = JwtIdentityResolver::new(SECRET, users);

        let forged = JwtTokenIssuer::new(b"other-secret", 3600).issue(&account).unwrap();
        assert!(resolver.resolve(&forged).await.unwrap().is_none());

        let expired = JwtTokenIssuer::new(SECRET, -120).issue(&account).unwrap();
        assert!(resolver.resolve(&expired).await.unwrap().is_none());

        assert!(resolver.resolve("garbage").await.unwrap().is_none());
    }
}
