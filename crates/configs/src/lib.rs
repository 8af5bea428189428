//! # configs
//!
//! Layered runtime settings: built-in defaults, an optional per-environment
//! TOML file, then `ADBAZAAR__*` environment variables. Secrets are wrapped
//! in `SecretString` so they never end up in debug output.

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: SecretString,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: SecretString,
    /// Seconds a login token stays valid.
    pub token_ttl_secs: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaBackend {
    S3,
    Local,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaSettings {
    pub backend: MediaBackend,
    /// S3 backend.
    pub bucket: String,
    pub region: String,
    /// Local backend.
    pub local_root: String,
    pub url_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub media: MediaSettings,
}

impl Settings {
    /// Loads settings for `run_mode` (e.g. "development", "production").
    ///
    /// Layering, later sources winning:
    /// 1. baked-in defaults below
    /// 2. `config/{run_mode}.toml`, if present
    /// 3. environment, `ADBAZAAR__SECTION__KEY` (dotenv file honored)
    pub fn load(run_mode: &str) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.max_connections", 8)?
            .set_default("auth.token_ttl_secs", 24 * 60 * 60)?
            .set_default("media.backend", "s3")?
            .set_default("media.bucket", "")?
            .set_default("media.region", "ap-south-1")?
            .set_default("media.local_root", "./data/uploads")?
            .set_default("media.url_prefix", "/static/uploads")?
            .add_source(
                config::File::with_name(&format!("config/{run_mode}")).required(false),
            )
            .add_source(
                config::Environment::with_prefix("ADBAZAAR")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let settings: Settings = settings.try_deserialize()?;
        tracing::debug!(server = ?settings.server, "settings loaded");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn environment_variables_fill_the_secrets() {
        std::env::set_var("ADBAZAAR__DATABASE__URL", "postgres://localhost/adbazaar");
        std::env::set_var("ADBAZAAR__AUTH__JWT_SECRET", "sekrit");

        let settings = Settings::load("nonexistent-mode").unwrap();
        assert_eq!(
            settings.database.url.expose_secret(),
            "postgres://localhost/adbazaar"
        );
        assert_eq!(settings.auth.jwt_secret.expose_secret(), "sekrit");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.media.backend, MediaBackend::S3);
    }
}
