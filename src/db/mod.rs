//! Database layer
//!
//! Local storage for partners, resorts and bookings. Every repository method
//! that reads or mutates tenant-owned data takes the owning partner id as a
//! mandatory predicate; there are no unscoped variants of those queries.

pub mod booking_repository;
pub mod partner_repository;
pub mod resort_repository;

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};

use crate::config::DatabaseConfig;

pub use booking_repository::{BookingRepository, NewBooking};
pub use partner_repository::PartnerRepository;
pub use resort_repository::{NewResort, ResortRepository};

/// Database connection pool type
pub type DbPool = Pool<Sqlite>;

/// Initialize the database connection pool and run migrations
pub async fn init_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
        .connect(&config.url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Parse a stored timestamp, tolerating both RFC 3339 and the bare
/// `YYYY-MM-DD HH:MM:SS` form SQLite defaults produce.
pub(crate) fn parse_db_timestamp(ts: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S") {
        return DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc);
    }
    Utc::now()
}
