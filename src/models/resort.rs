//! Resort model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A bookable property belonging to exactly one partner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resort {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub name: String,
    pub location: String,
    pub description: String,
    /// Smallest currency unit (cents)
    pub base_price_per_night: i64,
    pub amenities: Vec<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Resort {
    /// Denormalized copy of the public fields, frozen into a booking at
    /// creation time so later edits never alter booking history.
    pub fn snapshot(&self) -> ResortSnapshot {
        ResortSnapshot {
            id: self.id,
            name: self.name.clone(),
            location: self.location.clone(),
            description: self.description.clone(),
            base_price_per_night: self.base_price_per_night,
            amenities: self.amenities.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

/// Independent copy of a resort's public fields at booking time.
/// No live reference back to the resort row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResortSnapshot {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub description: String,
    pub base_price_per_night: i64,
    pub amenities: Vec<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateResortRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub description: String,
    /// Whole currency units as entered on the dashboard; stored as cents
    #[validate(range(min = 1))]
    pub base_price_per_night: i64,
    /// Comma-separated amenities as entered on the dashboard
    #[serde(default)]
    pub amenities: String,
    #[serde(default)]
    pub image_url: Option<String>,
}
