//! Tenant storefront endpoints
//!
//! These routes live under the `/tenants/{subdomain}` namespace the
//! gatekeeper rewrites into. The path segment re-derives partner identity
//! for read-only display; the booking creation below is the one public
//! mutating flow, and it re-verifies ownership with a compound resort check
//! rather than trusting the path segment or the submitted resort id alone.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::db::{BookingRepository, PartnerRepository, ResortRepository};
use crate::models::{
    Booking, CheckoutResponse, CreateBookingRequest, PartnerStorefront, Partner, Resort,
};
use crate::services::booking;
use crate::utils::{AppError, AppResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tenants/{subdomain}", get(storefront))
        .route("/tenants/{subdomain}/", get(storefront))
        .route("/tenants/{subdomain}/bookings", post(create_booking))
        .route("/tenants/{subdomain}/bookings/{booking_id}", get(get_booking))
}

#[derive(Debug, serde::Serialize)]
struct StorefrontResponse {
    partner: PartnerStorefront,
    resorts: Vec<Resort>,
}

async fn load_partner(state: &AppState, subdomain: &str) -> AppResult<Partner> {
    let repo = PartnerRepository::new(&state.db);
    repo.find_by_subdomain(subdomain)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load storefront partner: {}", e);
            AppError::internal("Failed to load storefront")
        })?
        .ok_or_else(|| AppError::not_found("Storefront not found"))
}

async fn storefront(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> AppResult<Json<StorefrontResponse>> {
    let partner = load_partner(&state, &subdomain).await?;

    let resorts = ResortRepository::new(&state.db)
        .list_for_partner(partner.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list storefront resorts: {}", e);
            AppError::internal("Failed to load storefront")
        })?;

    Ok(Json(StorefrontResponse {
        partner: partner.storefront(),
        resorts,
    }))
}

async fn create_booking(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<CheckoutResponse>)> {
    payload.validate()?;

    let partner = load_partner(&state, &subdomain).await?;
    let outcome = booking::create_booking(&state, partner.id, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            booking_id: outcome.booking.id,
            checkout_url: outcome.checkout_url,
        }),
    ))
}

/// Booking view for itinerary and success pages. The compound predicate
/// makes a booking under another partner indistinguishable from a missing
/// one.
async fn get_booking(
    State(state): State<AppState>,
    Path((subdomain, booking_id)): Path<(String, Uuid)>,
) -> AppResult<Json<Booking>> {
    let partner = load_partner(&state, &subdomain).await?;

    let booking = BookingRepository::new(&state.db)
        .find_for_partner(booking_id, partner.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load booking: {}", e);
            AppError::internal("Failed to load booking")
        })?
        .ok_or_else(|| AppError::not_found("Booking not found"))?;

    Ok(Json(booking))
}
