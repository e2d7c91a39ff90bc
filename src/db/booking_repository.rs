//! Booking repository
//!
//! Bookings are insert-then-single-update rows: created `pending` at checkout
//! initiation, flipped to `paid` once by the verified gateway callback. They
//! are never deleted. All partner-facing reads are scoped by partner id.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::parse_db_timestamp;
use crate::models::{Booking, BookingStatus, ItineraryDay, ResortSnapshot};

#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: String,
    partner_id: String,
    customer_email: Option<String>,
    customer_name: Option<String>,
    total_price: i64,
    resort_details: String,
    itinerary_data: Option<String>,
    kids_ages: Option<String>,
    status: String,
    created_at: String,
}

/// Fields for a new pending booking.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub partner_id: Uuid,
    pub total_price: i64,
    pub resort_details: ResortSnapshot,
    pub itinerary_data: Vec<ItineraryDay>,
    /// None when the trip has no kids; never an empty list
    pub kids_ages: Option<Vec<i32>>,
}

pub struct BookingRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> BookingRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, booking: &NewBooking) -> Result<Booking> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();
        let resort_details = serde_json::to_string(&booking.resort_details)
            .context("Failed to encode resort snapshot")?;
        let itinerary_data = serde_json::to_string(&booking.itinerary_data)
            .context("Failed to encode itinerary")?;
        let kids_ages = booking
            .kids_ages
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .context("Failed to encode kids ages")?;

        sqlx::query(
            r#"
            INSERT INTO bookings (id, partner_id, total_price, resort_details, itinerary_data, kids_ages, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, 'pending', ?)
            "#,
        )
        .bind(id.to_string())
        .bind(booking.partner_id.to_string())
        .bind(booking.total_price)
        .bind(&resort_details)
        .bind(&itinerary_data)
        .bind(&kids_ages)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to insert booking")?;

        self.find_by_id(id)
            .await?
            .context("Failed to retrieve created booking")
    }

    /// Unscoped lookup, reserved for the webhook correlation path where the
    /// booking id comes from a signature-verified gateway event.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT id, partner_id, customer_email, customer_name, total_price, resort_details, itinerary_data, kids_ages, status, created_at
            FROM bookings
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get booking")?;

        row.map(row_to_booking).transpose()
    }

    /// Compound lookup for storefront pages: the booking must belong to the
    /// partner resolved from the request's subdomain.
    pub async fn find_for_partner(&self, id: Uuid, partner_id: Uuid) -> Result<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT id, partner_id, customer_email, customer_name, total_price, resort_details, itinerary_data, kids_ages, status, created_at
            FROM bookings
            WHERE id = ? AND partner_id = ?
            "#,
        )
        .bind(id.to_string())
        .bind(partner_id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get booking")?;

        row.map(row_to_booking).transpose()
    }

    pub async fn list_for_partner(&self, partner_id: Uuid) -> Result<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT id, partner_id, customer_email, customer_name, total_price, resort_details, itinerary_data, kids_ages, status, created_at
            FROM bookings
            WHERE partner_id = ?
            ORDER BY created_at
            "#,
        )
        .bind(partner_id.to_string())
        .fetch_all(self.pool)
        .await
        .context("Failed to list bookings")?;

        rows.into_iter().map(row_to_booking).collect()
    }

    pub async fn latest_for_partner(&self, partner_id: Uuid) -> Result<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT id, partner_id, customer_email, customer_name, total_price, resort_details, itinerary_data, kids_ages, status, created_at
            FROM bookings
            WHERE partner_id = ?
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(partner_id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get latest booking")?;

        row.map(row_to_booking).transpose()
    }

    /// Record payment confirmation. A single-row, single-statement update
    /// keyed by booking id: replaying the same event re-sets the same values,
    /// so delivery more than once is harmless.
    pub async fn mark_paid(
        &self,
        id: Uuid,
        customer_email: Option<&str>,
        customer_name: Option<&str>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET status = 'paid', customer_email = ?, customer_name = ?
            WHERE id = ?
            "#,
        )
        .bind(customer_email)
        .bind(customer_name)
        .bind(id.to_string())
        .execute(self.pool)
        .await
        .context("Failed to mark booking paid")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_booking(row: BookingRow) -> Result<Booking> {
    let resort_details: ResortSnapshot = serde_json::from_str(&row.resort_details)
        .context("Corrupt resort snapshot in booking row")?;
    let itinerary_data: Option<Vec<ItineraryDay>> = row
        .itinerary_data
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context("Corrupt itinerary in booking row")?;
    let kids_ages: Option<Vec<i32>> = row
        .kids_ages
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context("Corrupt kids ages in booking row")?;

    Ok(Booking {
        id: Uuid::parse_str(&row.id).unwrap_or_else(|_| Uuid::nil()),
        partner_id: Uuid::parse_str(&row.partner_id).unwrap_or_else(|_| Uuid::nil()),
        customer_email: row.customer_email,
        customer_name: row.customer_name,
        total_price: row.total_price,
        resort_details,
        itinerary_data,
        kids_ages,
        status: BookingStatus::parse(&row.status).unwrap_or(BookingStatus::Pending),
        created_at: parse_db_timestamp(&row.created_at),
    })
}
