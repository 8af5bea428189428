//! # seed
//!
//! Development utility: inserts a demo publisher, advertiser, and one board
//! so a fresh database has something to look at. Idempotent: rows that
//! already exist are left alone.

use anyhow::Context;
use chrono::Utc;
use domains::CredentialHasher;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

const DEMO_PASSWORD: &str = "adbazaar-demo";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .context("failed to connect")?;

    let hasher = auth_adapters::Argon2CredentialHasher::new();
    let password_hash = hasher
        .hash(DEMO_PASSWORD)
        .map_err(|err| anyhow::anyhow!("hashing failed: {err}"))?;

    let now = Utc::now();
    let owner_id = Uuid::new_v4();
    let advertiser_id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $6) \
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(owner_id)
    .bind("Demo Publisher")
    .bind("publisher@adbazaar.test")
    .bind(&password_hash)
    .bind("Owner")
    .bind(now)
    .execute(&pool)
    .await?;

    sqlx::query(
        "INSERT INTO companies (id, name, user_id) VALUES ($1, $2, $3) \
         ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(Uuid::new_v4())
    .bind("Demo Hoardings Pvt Ltd")
    .bind(owner_id)
    .execute(&pool)
    .await?;

    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $6) \
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(advertiser_id)
    .bind("Demo Advertiser")
    .bind("advertiser@adbazaar.test")
    .bind(&password_hash)
    .bind("Advertiser")
    .bind(now)
    .execute(&pool)
    .await?;

    sqlx::query(
        "INSERT INTO ad_boards \
         (id, board_name, location, board_type, daily_rate, operational_hours, \
          owner_contact, dimensions, is_available, image_urls, created_by, \
          last_maintenance_at, created_at, updated_at) \
         SELECT $1, $2, $3, $4, $5, $6, $7, $8, TRUE, '{}', u.id, $9, $9, $9 \
         FROM users u \
         WHERE u.email = 'publisher@adbazaar.test' \
           AND NOT EXISTS (SELECT 1 FROM ad_boards WHERE board_name = $2)",
    )
    .bind(Uuid::new_v4())
    .bind("Highway 9")
    .bind("Pune")
    .bind("Static")
    .bind(1500.0_f64)
    .bind("9 AM - 5 PM")
    .bind("9876543210")
    .bind("10x20 ft")
    .bind(now)
    .execute(&pool)
    .await?;

    println!("seeded demo users (password: {DEMO_PASSWORD}) and one board");
    Ok(())
}
