//! Resort repository
//!
//! Every read and write is filtered by the owning partner id; deletes use the
//! compound (id AND partner_id) predicate, never the entity id alone.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::parse_db_timestamp;
use crate::models::Resort;

#[derive(Debug, sqlx::FromRow)]
struct ResortRow {
    id: String,
    partner_id: String,
    name: String,
    location: String,
    description: String,
    base_price_per_night: i64,
    amenities: String,
    image_url: Option<String>,
    created_at: String,
}

/// Fields for a new resort row; the price is already in cents.
#[derive(Debug, Clone)]
pub struct NewResort {
    pub name: String,
    pub location: String,
    pub description: String,
    pub base_price_per_night: i64,
    pub amenities: Vec<String>,
    pub image_url: Option<String>,
}

pub struct ResortRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ResortRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, partner_id: Uuid, resort: &NewResort) -> Result<Resort> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();
        let amenities =
            serde_json::to_string(&resort.amenities).context("Failed to encode amenities")?;

        sqlx::query(
            r#"
            INSERT INTO resorts (id, partner_id, name, location, description, base_price_per_night, amenities, image_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(partner_id.to_string())
        .bind(&resort.name)
        .bind(&resort.location)
        .bind(&resort.description)
        .bind(resort.base_price_per_night)
        .bind(&amenities)
        .bind(&resort.image_url)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to create resort")?;

        self.find_for_partner(id, partner_id)
            .await?
            .context("Failed to retrieve created resort")
    }

    pub async fn list_for_partner(&self, partner_id: Uuid) -> Result<Vec<Resort>> {
        let rows = sqlx::query_as::<_, ResortRow>(
            r#"
            SELECT id, partner_id, name, location, description, base_price_per_night, amenities, image_url, created_at
            FROM resorts
            WHERE partner_id = ?
            ORDER BY created_at
            "#,
        )
        .bind(partner_id.to_string())
        .fetch_all(self.pool)
        .await
        .context("Failed to list resorts")?;

        Ok(rows.into_iter().map(row_to_resort).collect())
    }

    /// Compound lookup: the resort must belong to the given partner.
    pub async fn find_for_partner(&self, id: Uuid, partner_id: Uuid) -> Result<Option<Resort>> {
        let row = sqlx::query_as::<_, ResortRow>(
            r#"
            SELECT id, partner_id, name, location, description, base_price_per_night, amenities, image_url, created_at
            FROM resorts
            WHERE id = ? AND partner_id = ?
            "#,
        )
        .bind(id.to_string())
        .bind(partner_id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get resort")?;

        Ok(row.map(row_to_resort))
    }

    /// Compound delete. Returns false when the resort does not exist or
    /// belongs to another partner; both cases are indistinguishable upstream.
    pub async fn delete_for_partner(&self, id: Uuid, partner_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM resorts WHERE id = ? AND partner_id = ?")
            .bind(id.to_string())
            .bind(partner_id.to_string())
            .execute(self.pool)
            .await
            .context("Failed to delete resort")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_resort(row: ResortRow) -> Resort {
    Resort {
        id: Uuid::parse_str(&row.id).unwrap_or_else(|_| Uuid::nil()),
        partner_id: Uuid::parse_str(&row.partner_id).unwrap_or_else(|_| Uuid::nil()),
        name: row.name,
        location: row.location,
        description: row.description,
        base_price_per_night: row.base_price_per_night,
        amenities: serde_json::from_str(&row.amenities).unwrap_or_default(),
        image_url: row.image_url,
        created_at: parse_db_timestamp(&row.created_at),
    }
}
