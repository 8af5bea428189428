//! # Users
//!
//! Registration, credential login, and profile maintenance.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    CredentialHasher, Error, MediaStorage, Result, Role, TokenIssuer, User, UserRepository,
};
use uuid::Uuid;

use crate::commands::{RegisterUser, UpdateProfile};
use crate::validate;

pub struct UserService {
    users: Arc<dyn UserRepository>,
    media: Arc<dyn MediaStorage>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenIssuer>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        media: Arc<dyn MediaStorage>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self { users, media, hasher, tokens }
    }

    pub async fn register(&self, cmd: RegisterUser) -> Result<User> {
        validate::required(&cmd.name, "name")?;
        validate::required(&cmd.email, "email")?;
        validate::required(&cmd.password, "password")?;

        // Publishers invoice their advertisers; they must register a company.
        let company_name = cmd.company_name.filter(|n| !n.trim().is_empty());
        if cmd.role == Role::Owner && company_name.is_none() {
            return Err(Error::Validation(
                "a company name is required for the owner role".into(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: cmd.name,
            email: cmd.email,
            password_hash: Some(self.hasher.hash(&cmd.password)?),
            profile_pic_url: None,
            role: cmd.role,
            company: None,
            created_at: now,
            updated_at: now,
        };

        let mut user = self.users.insert(user).await?;
        if let Some(name) = company_name {
            let company = self.users.upsert_company(user.id, name).await?;
            user.company = Some(company);
        }
        Ok(user)
    }

    /// Verifies credentials and mints a bearer token.
    ///
    /// Absent accounts, OAuth-only accounts, and wrong passwords all yield
    /// the same unauthorized error.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String)> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| Error::Unauthorized("invalid credentials".into()))?;

        let hash = user
            .password_hash
            .as_deref()
            .ok_or_else(|| Error::Unauthorized("invalid credentials".into()))?;
        if !self.hasher.verify(password, hash) {
            return Err(Error::Unauthorized("invalid credentials".into()));
        }

        let token = self.tokens.issue(&user)?;
        Ok((user, token))
    }

    pub async fn profile(&self, email: &str) -> Result<User> {
        self.users
            .find_by_email(email)
            .await?
            .ok_or(Error::NotFound("user"))
    }

    /// Merges the supplied fields into the stored profile; anything left
    /// unspecified keeps its current value.
    pub async fn update_profile(&self, email: &str, cmd: UpdateProfile) -> Result<User> {
        self.profile(email).await?;

        let profile_pic_url = match cmd.profile_pic {
            Some(file) => {
                validate::upload_size(&file, "profile picture")?;
                Some(self.media.upload(file).await?.url)
            }
            None => None,
        };

        let updated = self
            .users
            .update_profile(email, cmd.name, profile_pic_url.clone())
            .await;
        let mut user = match updated {
            Ok(user) => user,
            Err(err) => {
                if let Some(url) = profile_pic_url {
                    self.discard_upload(&url).await;
                }
                return Err(err);
            }
        };

        if let Some(name) = cmd.company_name.filter(|n| !n.trim().is_empty()) {
            let company = self.users.upsert_company(user.id, name).await?;
            user.company = Some(company);
        }
        Ok(user)
    }

    async fn discard_upload(&self, url: &str) {
        if let Err(err) = self.media.remove(url).await {
            tracing::warn!(%url, %err, "failed to remove uploaded profile picture after persistence failure");
        }
    }
}
