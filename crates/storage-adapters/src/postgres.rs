//! # Postgres Adapter
//!
//! Maps the relational schema onto the domain models. Queries are
//! runtime-checked; enum columns are stored as TEXT and round-tripped
//! through the domain parsers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{
    Ad, AdBoard, AdBoardRepository, AdRepository, BoardType, Booking, BookingRepository,
    BookingStatus, Company, Error, Result, Role, User, UserRepository,
};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use uuid::Uuid;

/// Postgres unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(into_internal)
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|err| {
            tracing::error!(%err, "database migration failed");
            Error::Internal("database migration failed".into())
        })
}

/// Logs the driver error and hides it behind a generic failure.
fn into_internal(err: sqlx::Error) -> Error {
    tracing::error!(%err, "database operation failed");
    Error::Internal("database operation failed".into())
}

fn board_from_row(row: &PgRow) -> Result<AdBoard> {
    Ok(AdBoard {
        id: row.try_get("id").map_err(into_internal)?,
        board_name: row.try_get("board_name").map_err(into_internal)?,
        location: row.try_get("location").map_err(into_internal)?,
        description: row.try_get("description").map_err(into_internal)?,
        board_type: BoardType::parse(&row.try_get::<String, _>("board_type").map_err(into_internal)?)?,
        daily_rate: row.try_get("daily_rate").map_err(into_internal)?,
        operational_hours: row.try_get("operational_hours").map_err(into_internal)?,
        owner_contact: row.try_get("owner_contact").map_err(into_internal)?,
        dimensions: row.try_get("dimensions").map_err(into_internal)?,
        is_available: row.try_get("is_available").map_err(into_internal)?,
        image_urls: row.try_get("image_urls").map_err(into_internal)?,
        created_by: row.try_get("created_by").map_err(into_internal)?,
        last_maintenance_at: row.try_get("last_maintenance_at").map_err(into_internal)?,
        created_at: row.try_get("created_at").map_err(into_internal)?,
        updated_at: row.try_get("updated_at").map_err(into_internal)?,
    })
}

fn ad_from_row(row: &PgRow) -> Result<Ad> {
    Ok(Ad {
        id: row.try_get("id").map_err(into_internal)?,
        title: row.try_get("title").map_err(into_internal)?,
        download_link: row.try_get("download_link").map_err(into_internal)?,
        video_url: row.try_get("video_url").map_err(into_internal)?,
        thumbnail_url: row.try_get("thumbnail_url").map_err(into_internal)?,
        duration_secs: row.try_get("duration_secs").map_err(into_internal)?,
        remarks: row.try_get("remarks").map_err(into_internal)?,
        created_by: row.try_get("created_by").map_err(into_internal)?,
        created_at: row.try_get("created_at").map_err(into_internal)?,
        updated_at: row.try_get("updated_at").map_err(into_internal)?,
    })
}

fn booking_from_row(row: &PgRow) -> Result<Booking> {
    Ok(Booking {
        id: row.try_get("id").map_err(into_internal)?,
        ad_id: row.try_get("ad_id").map_err(into_internal)?,
        ad_board_id: row.try_get("ad_board_id").map_err(into_internal)?,
        booked_by: row.try_get("booked_by").map_err(into_internal)?,
        start_date: row.try_get("start_date").map_err(into_internal)?,
        end_date: row.try_get("end_date").map_err(into_internal)?,
        status: BookingStatus::parse(&row.try_get::<String, _>("status").map_err(into_internal)?)?,
        created_at: row.try_get("created_at").map_err(into_internal)?,
        updated_at: row.try_get("updated_at").map_err(into_internal)?,
    })
}

fn user_from_row(row: &PgRow) -> Result<User> {
    let company = match row.try_get::<Option<Uuid>, _>("company_id").map_err(into_internal)? {
        Some(id) => Some(Company {
            id,
            name: row.try_get("company_name").map_err(into_internal)?,
            user_id: row.try_get("id").map_err(into_internal)?,
        }),
        None => None,
    };
    Ok(User {
        id: row.try_get("id").map_err(into_internal)?,
        name: row.try_get("name").map_err(into_internal)?,
        email: row.try_get("email").map_err(into_internal)?,
        password_hash: row.try_get("password_hash").map_err(into_internal)?,
        profile_pic_url: row.try_get("profile_pic_url").map_err(into_internal)?,
        role: Role::parse(&row.try_get::<String, _>("role").map_err(into_internal)?)?,
        company,
        created_at: row.try_get("created_at").map_err(into_internal)?,
        updated_at: row.try_get("updated_at").map_err(into_internal)?,
    })
}

const USER_COLUMNS: &str = "u.id, u.name, u.email, u.password_hash, u.profile_pic_url, \
     u.role, u.created_at, u.updated_at, c.id AS company_id, c.name AS company_name";

#[derive(Clone)]
pub struct PgAdBoardRepository {
    pool: PgPool,
}

impl PgAdBoardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdBoardRepository for PgAdBoardRepository {
    async fn insert(&self, board: AdBoard) -> Result<AdBoard> {
        let row = sqlx::query(
            "INSERT INTO ad_boards \
             (id, board_name, location, description, board_type, daily_rate, \
              operational_hours, owner_contact, dimensions, is_available, image_urls, \
              created_by, last_maintenance_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING *",
        )
        .bind(board.id)
        .bind(&board.board_name)
        .bind(&board.location)
        .bind(&board.description)
        .bind(board.board_type.as_str())
        .bind(board.daily_rate)
        .bind(&board.operational_hours)
        .bind(&board.owner_contact)
        .bind(&board.dimensions)
        .bind(board.is_available)
        .bind(&board.image_urls)
        .bind(board.created_by)
        .bind(board.last_maintenance_at)
        .bind(board.created_at)
        .bind(board.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(into_internal)?;
        board_from_row(&row)
    }

    async fn find(&self, id: Uuid) -> Result<Option<AdBoard>> {
        let row = sqlx::query("SELECT * FROM ad_boards WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(into_internal)?;
        row.as_ref().map(board_from_row).transpose()
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<AdBoard>> {
        let rows = sqlx::query("SELECT * FROM ad_boards WHERE created_by = $1")
            .bind(owner)
            .fetch_all(&self.pool)
            .await
            .map_err(into_internal)?;
        rows.iter().map(board_from_row).collect()
    }

    async fn update(&self, board: AdBoard) -> Result<AdBoard> {
        let row = sqlx::query(
            "UPDATE ad_boards SET \
             board_name = $2, location = $3, description = $4, board_type = $5, \
             daily_rate = $6, operational_hours = $7, owner_contact = $8, dimensions = $9, \
             is_available = $10, image_urls = $11, last_maintenance_at = $12, updated_at = $13 \
             WHERE id = $1 \
             RETURNING *",
        )
        .bind(board.id)
        .bind(&board.board_name)
        .bind(&board.location)
        .bind(&board.description)
        .bind(board.board_type.as_str())
        .bind(board.daily_rate)
        .bind(&board.operational_hours)
        .bind(&board.owner_contact)
        .bind(&board.dimensions)
        .bind(board.is_available)
        .bind(&board.image_urls)
        .bind(board.last_maintenance_at)
        .bind(board.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(into_internal)?
        .ok_or(Error::NotFound("ad board"))?;
        board_from_row(&row)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM ad_boards WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(into_internal)?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgAdRepository {
    pool: PgPool,
}

impl PgAdRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdRepository for PgAdRepository {
    async fn insert(&self, ad: Ad) -> Result<Ad> {
        let row = sqlx::query(
            "INSERT INTO ads \
             (id, title, download_link, video_url, thumbnail_url, duration_secs, remarks, \
              created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING *",
        )
        .bind(ad.id)
        .bind(&ad.title)
        .bind(&ad.download_link)
        .bind(&ad.video_url)
        .bind(&ad.thumbnail_url)
        .bind(ad.duration_secs)
        .bind(&ad.remarks)
        .bind(ad.created_by)
        .bind(ad.created_at)
        .bind(ad.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(into_internal)?;
        ad_from_row(&row)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Ad>> {
        let row = sqlx::query("SELECT * FROM ads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(into_internal)?;
        row.as_ref().map(ad_from_row).transpose()
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Ad>> {
        let rows = sqlx::query("SELECT * FROM ads WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(into_internal)?;
        rows.iter().map(ad_from_row).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM ads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(into_internal)?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn insert(&self, booking: Booking) -> Result<Booking> {
        if booking.start_date > booking.end_date {
            return Err(Error::Validation(
                "booking start date must not be after the end date".into(),
            ));
        }
        let row = sqlx::query(
            "INSERT INTO bookings \
             (id, ad_id, ad_board_id, booked_by, start_date, end_date, status, \
              created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING *",
        )
        .bind(booking.id)
        .bind(booking.ad_id)
        .bind(booking.ad_board_id)
        .bind(booking.booked_by)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(into_internal)?;
        booking_from_row(&row)
    }

    async fn list_overlapping(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Booking>> {
        let rows = sqlx::query(
            "SELECT * FROM bookings WHERE start_date <= $2 AND end_date >= $1",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(into_internal)?;
        rows.iter().map(booking_from_row).collect()
    }

    async fn find_by_ad(&self, ad_id: Uuid) -> Result<Vec<Booking>> {
        let rows = sqlx::query("SELECT * FROM bookings WHERE ad_id = $1")
            .bind(ad_id)
            .fetch_all(&self.pool)
            .await
            .map_err(into_internal)?;
        rows.iter().map(booking_from_row).collect()
    }

    async fn reschedule(
        &self,
        ad_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<()> {
        if start > end {
            return Err(Error::Validation(
                "booking start date must not be after the end date".into(),
            ));
        }
        sqlx::query(
            "UPDATE bookings SET start_date = $2, end_date = $3, updated_at = now() \
             WHERE ad_id = $1",
        )
        .bind(ad_id)
        .bind(start)
        .bind(end)
        .execute(&self.pool)
        .await
        .map_err(into_internal)?;
        Ok(())
    }

    async fn delete_by_ad(&self, ad_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM bookings WHERE ad_id = $1")
            .bind(ad_id)
            .execute(&self.pool)
            .await
            .map_err(into_internal)?;
        Ok(())
    }

    async fn delete_by_board(&self, board_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM bookings WHERE ad_board_id = $1")
            .bind(board_id)
            .execute(&self.pool)
            .await
            .map_err(into_internal)?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: User) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users \
             (id, name, email, password_hash, profile_pic_url, role, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.profile_pic_url)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(err) => {
                let unique = err
                    .as_database_error()
                    .and_then(|db| db.code())
                    .is_some_and(|code| code == UNIQUE_VIOLATION);
                if unique {
                    Err(Error::Conflict("email already in use".into()))
                } else {
                    Err(into_internal(err))
                }
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users u \
             LEFT JOIN companies c ON c.user_id = u.id WHERE u.email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(into_internal)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn update_profile(
        &self,
        email: &str,
        name: Option<String>,
        profile_pic_url: Option<String>,
    ) -> Result<User> {
        let updated = sqlx::query(
            "UPDATE users SET \
             name = COALESCE($2, name), \
             profile_pic_url = COALESCE($3, profile_pic_url), \
             updated_at = now() \
             WHERE email = $1",
        )
        .bind(email)
        .bind(name)
        .bind(profile_pic_url)
        .execute(&self.pool)
        .await
        .map_err(into_internal)?;

        if updated.rows_affected() == 0 {
            return Err(Error::NotFound("user"));
        }
        self.find_by_email(email)
            .await?
            .ok_or(Error::NotFound("user"))
    }

    async fn upsert_company(&self, user_id: Uuid, name: String) -> Result<Company> {
        let row = sqlx::query(
            "INSERT INTO companies (id, name, user_id) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id) DO UPDATE SET name = EXCLUDED.name \
             RETURNING id, name, user_id",
        )
        .bind(Uuid::new_v4())
        .bind(&name)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(into_internal)?;

        Ok(Company {
            id: row.try_get("id").map_err(into_internal)?,
            name: row.try_get("name").map_err(into_internal)?,
            user_id: row.try_get("user_id").map_err(into_internal)?,
        })
    }
}
