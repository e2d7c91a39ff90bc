//! Partner (tenant) repository

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::parse_db_timestamp;
use crate::models::Partner;

#[derive(Debug, sqlx::FromRow)]
struct PartnerRow {
    id: String,
    user_id: String,
    subdomain: String,
    markup_rate: i64,
    stripe_account_id: Option<String>,
    brand_tone: String,
    logo_url: Option<String>,
    created_at: String,
}

pub struct PartnerRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PartnerRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: &str,
        subdomain: &str,
        markup_rate: i64,
        stripe_account_id: Option<&str>,
        brand_tone: &str,
    ) -> Result<Partner> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO partners (id, user_id, subdomain, markup_rate, stripe_account_id, brand_tone, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(user_id)
        .bind(subdomain)
        .bind(markup_rate)
        .bind(stripe_account_id)
        .bind(brand_tone)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to create partner")?;

        self.find_by_id(id)
            .await?
            .context("Failed to retrieve created partner")
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Partner>> {
        let row = sqlx::query_as::<_, PartnerRow>(
            r#"
            SELECT id, user_id, subdomain, markup_rate, stripe_account_id, brand_tone, logo_url, created_at
            FROM partners
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get partner")?;

        Ok(row.map(row_to_partner))
    }

    /// Look up the partner owned by a verified user identity.
    /// The owning-identity column is unique, so this is exactly zero or one.
    pub async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Partner>> {
        let row = sqlx::query_as::<_, PartnerRow>(
            r#"
            SELECT id, user_id, subdomain, markup_rate, stripe_account_id, brand_tone, logo_url, created_at
            FROM partners
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to get partner by user")?;

        Ok(row.map(row_to_partner))
    }

    /// Exact match against the stored lowercase subdomain.
    pub async fn find_by_subdomain(&self, subdomain: &str) -> Result<Option<Partner>> {
        let row = sqlx::query_as::<_, PartnerRow>(
            r#"
            SELECT id, user_id, subdomain, markup_rate, stripe_account_id, brand_tone, logo_url, created_at
            FROM partners
            WHERE subdomain = ?
            "#,
        )
        .bind(subdomain)
        .fetch_optional(self.pool)
        .await
        .context("Failed to get partner by subdomain")?;

        Ok(row.map(row_to_partner))
    }

    pub async fn subdomain_exists(&self, subdomain: &str) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM partners WHERE subdomain = ?")
            .bind(subdomain)
            .fetch_optional(self.pool)
            .await
            .context("Failed to check subdomain")?;

        Ok(row.is_some())
    }

    /// Settings update, scoped by the resolved partner id.
    /// The subdomain is immutable and deliberately not updatable here.
    pub async fn update_settings(
        &self,
        id: Uuid,
        markup_rate: i64,
        brand_tone: &str,
        logo_url: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE partners
            SET markup_rate = ?, brand_tone = ?, logo_url = ?
            WHERE id = ?
            "#,
        )
        .bind(markup_rate)
        .bind(brand_tone)
        .bind(logo_url)
        .bind(id.to_string())
        .execute(self.pool)
        .await
        .context("Failed to update partner settings")?;

        Ok(())
    }
}

fn row_to_partner(row: PartnerRow) -> Partner {
    Partner {
        id: Uuid::parse_str(&row.id).unwrap_or_else(|_| Uuid::nil()),
        user_id: row.user_id,
        subdomain: row.subdomain,
        markup_rate: row.markup_rate,
        stripe_account_id: row.stripe_account_id,
        brand_tone: row.brand_tone,
        logo_url: row.logo_url,
        created_at: parse_db_timestamp(&row.created_at),
    }
}
