//! # adbazaar
//!
//! The server binary: assembles the configured adapter stack, wires the
//! services, and serves the HTTP surface.

use std::sync::Arc;

use anyhow::Context;
use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

use api_adapters::AppState;
use auth_adapters::{Argon2CredentialHasher, JwtIdentityResolver, JwtTokenIssuer};
use configs::{MediaBackend, Settings};
use domains::MediaStorage;
use services::{
    AdBoardService, CreativeService, MediaService, ReconciliationService, UserService,
};
use storage_adapters::postgres::{
    self, PgAdBoardRepository, PgAdRepository, PgBookingRepository, PgUserRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // sqlx and the AWS SDK both speak TLS through rustls.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
    let settings = Settings::load(&run_mode).context("failed to load settings")?;

    let pool = postgres::connect(
        settings.database.url.expose_secret(),
        settings.database.max_connections,
    )
    .await
    .context("failed to connect to the database")?;
    postgres::run_migrations(&pool)
        .await
        .context("failed to run migrations")?;

    let boards = Arc::new(PgAdBoardRepository::new(pool.clone()));
    let ads = Arc::new(PgAdRepository::new(pool.clone()));
    let bookings = Arc::new(PgBookingRepository::new(pool.clone()));
    let users = Arc::new(PgUserRepository::new(pool));

    let media: Arc<dyn MediaStorage> = match settings.media.backend {
        #[cfg(feature = "media-s3")]
        MediaBackend::S3 => Arc::new(
            storage_adapters::s3::S3MediaStorage::from_env(
                settings.media.bucket.clone(),
                settings.media.region.clone(),
            )
            .await,
        ),
        #[cfg(feature = "media-local")]
        MediaBackend::Local => Arc::new(storage_adapters::local::LocalMediaStorage::new(
            settings.media.local_root.clone().into(),
            settings.media.url_prefix.clone(),
        )),
        #[allow(unreachable_patterns)]
        other => anyhow::bail!("media backend {other:?} is not compiled into this binary"),
    };

    let jwt_secret = settings.auth.jwt_secret.expose_secret().as_bytes();
    let hasher = Arc::new(Argon2CredentialHasher::new());
    let issuer = Arc::new(JwtTokenIssuer::new(jwt_secret, settings.auth.token_ttl_secs));
    let identity = Arc::new(JwtIdentityResolver::new(jwt_secret, users.clone()));

    let state = AppState {
        ad_boards: Arc::new(AdBoardService::new(
            boards.clone(),
            bookings.clone(),
            media.clone(),
        )),
        creatives: Arc::new(CreativeService::new(
            ads.clone(),
            boards.clone(),
            bookings.clone(),
            media.clone(),
        )),
        reconciliation: Arc::new(ReconciliationService::new(boards, ads, bookings)),
        users: Arc::new(UserService::new(users, media.clone(), hasher, issuer)),
        media: Arc::new(MediaService::new(media)),
        identity,
    };

    let app = api_adapters::router(state);
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, "adbazaar listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
    }
}
