//! Partner (tenant) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_BRAND_TONE: &str = "luxurious, warm, and personalized";
pub const DEFAULT_MARKUP_RATE: i64 = 10;

/// A marketplace seller with its own subdomain storefront.
///
/// The subdomain is globally unique and immutable once claimed; every resort
/// and booking row is owned by exactly one partner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    pub id: Uuid,
    /// Verified subject from the external identity provider
    pub user_id: String,
    pub subdomain: String,
    /// Integer percent added on top of the resort base price
    pub markup_rate: i64,
    /// Payout account at the payment gateway; None until onboarding completes
    pub stripe_account_id: Option<String>,
    pub brand_tone: String,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Partner {
    /// Whether the payout account can actually receive transfers.
    ///
    /// Placeholder and test account ids mean the platform retains the full
    /// amount and no transfer is requested.
    pub fn has_real_payout_account(&self) -> bool {
        match &self.stripe_account_id {
            Some(id) => !id.starts_with("acct_1placeholder") && !id.contains("test"),
            None => false,
        }
    }

    /// Public brand fields exposed on the storefront.
    pub fn storefront(&self) -> PartnerStorefront {
        PartnerStorefront {
            subdomain: self.subdomain.clone(),
            brand_tone: self.brand_tone.clone(),
            logo_url: self.logo_url.clone(),
        }
    }
}

/// Brand fields safe to render on the public storefront
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerStorefront {
    pub subdomain: String,
    pub brand_tone: String,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePartnerRequest {
    #[validate(length(min = 1, max = 63))]
    pub subdomain: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePartnerSettingsRequest {
    #[validate(range(min = 0))]
    pub markup_rate: i64,
    /// Blank falls back to the default brand tone
    pub brand_tone: Option<String>,
    /// Blank clears the logo
    pub logo_url: Option<String>,
}

/// Result of partner onboarding: the created partner plus the gateway
/// account-link URL the new partner must visit to finish payout setup.
#[derive(Debug, Clone, Serialize)]
pub struct PartnerOnboarding {
    pub partner: Partner,
    pub onboarding_url: String,
}
