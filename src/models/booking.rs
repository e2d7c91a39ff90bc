//! Booking model and itinerary structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::ResortSnapshot;

/// Booking lifecycle state. Transitions pending -> paid exactly once, driven
/// only by a verified payment-gateway callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Paid,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Paid => "paid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(BookingStatus::Pending),
            "paid" => Some(BookingStatus::Paid),
            _ => None,
        }
    }
}

/// A customer booking owned by exactly one partner.
///
/// `total_price` is immutable after creation; customer email/name stay None
/// until the payment callback records them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    /// Integer cents
    pub total_price: i64,
    pub resort_details: ResortSnapshot,
    pub itinerary_data: Option<Vec<ItineraryDay>>,
    /// None means "no kids on this trip", distinct from an empty list
    pub kids_ages: Option<Vec<i32>>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// One day of a generated itinerary. A booking always carries exactly five,
/// numbered 1 through 5 in order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItineraryDay {
    pub day: u8,
    pub title: String,
    pub activities: Vec<String>,
    pub dining: DiningPlan,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiningPlan {
    pub breakfast: String,
    pub lunch: String,
    pub dinner: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub resort_id: Uuid,
    /// Defaults to a five-night stay when unspecified
    #[serde(default)]
    pub nights: Option<i64>,
    /// Comma-separated ages; non-numeric tokens are discarded
    #[serde(default)]
    pub kids_ages: Option<String>,
    #[validate(email)]
    #[serde(default)]
    pub customer_email: Option<String>,
}

/// Response for checkout initiation: where to send the customer next.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub booking_id: Uuid,
    pub checkout_url: String,
}
