//! Partner dashboard endpoints
//!
//! Every handler here resolves the partner from the authenticated session via
//! `services::tenancy`, never from client-supplied ids.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::db::{BookingRepository, PartnerRepository};
use crate::middleware::AuthUser;
use crate::models::{
    Booking, CreatePartnerRequest, Partner, PartnerOnboarding, UpdatePartnerSettingsRequest,
    DEFAULT_BRAND_TONE, DEFAULT_MARKUP_RATE,
};
use crate::services::email::ConfirmationEmail;
use crate::services::itinerary::fallback_itinerary;
use crate::services::tenancy;
use crate::utils::validation::validate_subdomain;
use crate::utils::{AppError, AppResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/partners", post(create_partner))
        .route("/partners/me", get(get_partner))
        .route("/partners/me/settings", put(update_settings))
        .route("/partners/me/test-email", post(send_test_email))
        .route("/bookings", get(list_bookings))
}

/// Partner onboarding: claim a subdomain and create the payout account.
async fn create_partner(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreatePartnerRequest>,
) -> AppResult<(StatusCode, Json<PartnerOnboarding>)> {
    payload.validate()?;

    let subdomain = payload.subdomain.trim().to_ascii_lowercase();
    if !validate_subdomain(&subdomain) {
        return Err(AppError::bad_request("Invalid subdomain"));
    }

    let repo = PartnerRepository::new(&state.db);
    if repo.find_by_user_id(&auth_user.user_id).await.map_err(|e| {
        tracing::error!("Failed to check existing partner: {}", e);
        AppError::internal("Failed to create partner")
    })?
    .is_some()
    {
        return Err(AppError::conflict("Partner already exists for this user"));
    }

    if repo.subdomain_exists(&subdomain).await.map_err(|e| {
        tracing::error!("Failed to check subdomain: {}", e);
        AppError::internal("Failed to create partner")
    })? {
        return Err(AppError::conflict("Subdomain already taken"));
    }

    let account_id = state.payments.create_express_account().await?;

    let partner = repo
        .create(
            &auth_user.user_id,
            &subdomain,
            DEFAULT_MARKUP_RATE,
            Some(&account_id),
            DEFAULT_BRAND_TONE,
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to create partner: {}", e);
            if e.to_string().contains("UNIQUE constraint failed") {
                AppError::conflict("Subdomain already taken")
            } else {
                AppError::internal("Failed to create partner")
            }
        })?;

    let onboarding_url = state
        .payments
        .create_account_link(&account_id, &state.config.tenancy.app_url)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PartnerOnboarding {
            partner,
            onboarding_url,
        }),
    ))
}

async fn get_partner(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<Partner>> {
    let partner = tenancy::resolve_partner(&state.db, &auth_user.user_id).await?;
    Ok(Json(partner))
}

async fn update_settings(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<UpdatePartnerSettingsRequest>,
) -> AppResult<Json<Partner>> {
    payload.validate()?;

    let partner_id = tenancy::resolve_partner_id(&state.db, &auth_user.user_id).await?;

    let brand_tone = payload
        .brand_tone
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_BRAND_TONE);
    let logo_url = payload
        .logo_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty());

    let repo = PartnerRepository::new(&state.db);
    repo.update_settings(partner_id, payload.markup_rate, brand_tone, logo_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update partner settings: {}", e);
            AppError::internal("Failed to update settings")
        })?;

    let partner = repo
        .find_by_id(partner_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to reload partner: {}", e);
            AppError::internal("Failed to update settings")
        })?
        .ok_or_else(|| AppError::not_found("Partner not found"))?;

    Ok(Json(partner))
}

async fn list_bookings(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<Vec<Booking>>> {
    let partner_id = tenancy::resolve_partner_id(&state.db, &auth_user.user_id).await?;

    let bookings = BookingRepository::new(&state.db)
        .list_for_partner(partner_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list bookings: {}", e);
            AppError::internal("Failed to list bookings")
        })?;

    Ok(Json(bookings))
}

/// Send a sample confirmation email to the configured test recipient,
/// throttled per partner.
async fn send_test_email(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<Value>> {
    let partner = tenancy::resolve_partner(&state.db, &auth_user.user_id).await?;

    if let Err(wait) = state.throttle.check(partner.id) {
        return Err(AppError::too_many_requests(format!(
            "Please wait {} seconds before sending another test email",
            wait
        )));
    }

    if !state.email.is_configured() {
        return Ok(Json(json!({
            "success": true,
            "message": "Test email simulated (email not configured)",
        })));
    }

    // Use the partner's latest booking where available, sample data otherwise.
    let latest = BookingRepository::new(&state.db)
        .latest_for_partner(partner.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load latest booking: {}", e);
            AppError::internal("Failed to send test email")
        })?;

    let (resort_name, itinerary, booking_id) = match latest {
        Some(booking) => (
            booking.resort_details.name.clone(),
            booking.itinerary_data.unwrap_or_else(|| fallback_itinerary(&[])),
            booking.id.to_string(),
        ),
        None => (
            "Sample Luxury Resort".to_string(),
            fallback_itinerary(&[]),
            "sample-booking".to_string(),
        ),
    };

    let recipient = state.email.test_recipient().to_string();
    state
        .email
        .send_test_email(&ConfirmationEmail {
            to: recipient.clone(),
            customer_name: "Test Customer".to_string(),
            resort_name,
            partner_name: partner.subdomain.clone(),
            booking_id,
            itinerary,
        })
        .await
        .map_err(|e| {
            tracing::error!("Test email failed: {}", e);
            AppError::internal("Failed to send test email")
        })?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Test email sent to {}", recipient),
    })))
}
