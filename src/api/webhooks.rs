//! Payment gateway webhook endpoints
//!
//! The confirmation path is driven by the inbound signed event, never by the
//! client. An invalid signature is rejected with 400 before any state is
//! touched. The booking update is a single-row write keyed by the event's
//! booking reference, so redelivery of the same event is harmless.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::{BookingRepository, PartnerRepository};
use crate::services::email::ConfirmationEmail;
use crate::services::payments::{verify_webhook_signature, WebhookEvent};
use crate::utils::{AppError, AppResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/stripe", post(stripe_webhook))
}

async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<StatusCode> {
    let signature = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !verify_webhook_signature(state.payments.webhook_secret(), &body, signature) {
        warn!("Webhook signature verification failed");
        return Err(AppError::bad_request("Invalid webhook signature"));
    }

    let event: WebhookEvent = serde_json::from_slice(&body).map_err(|e| {
        warn!("Failed to parse webhook payload: {}", e);
        AppError::bad_request("Invalid webhook payload")
    })?;

    if event.event_type != "checkout.session.completed" {
        return Ok(StatusCode::OK);
    }

    let session = event.data.object;
    let Some(booking_id) = session
        .client_reference_id
        .as_deref()
        .and_then(|id| Uuid::parse_str(id).ok())
    else {
        // Nothing to correlate; acknowledge so the gateway stops retrying.
        return Ok(StatusCode::OK);
    };

    let customer_email = session.email().map(String::from);
    let customer_name = session
        .name()
        .map(String::from)
        .unwrap_or_else(|| "Valued Guest".to_string());

    let bookings = BookingRepository::new(&state.db);
    let updated = bookings
        .mark_paid(booking_id, customer_email.as_deref(), Some(&customer_name))
        .await
        .map_err(|e| {
            tracing::error!("Failed to record payment confirmation: {}", e);
            AppError::internal("Failed to process webhook")
        })?;

    if !updated {
        warn!(booking_id = %booking_id, "Payment event for unknown booking");
        return Ok(StatusCode::OK);
    }

    info!(booking_id = %booking_id, "Booking marked as paid");

    // Confirmation email is best-effort: the committed payment confirmation
    // is authoritative regardless of notification outcome.
    if let Some(to) = customer_email {
        if let Err(err) = send_confirmation(&state, booking_id, &to, &customer_name).await {
            warn!(booking_id = %booking_id, error = %err, "Confirmation email failed");
        }
    }

    Ok(StatusCode::OK)
}

async fn send_confirmation(
    state: &AppState,
    booking_id: Uuid,
    to: &str,
    customer_name: &str,
) -> anyhow::Result<()> {
    let bookings = BookingRepository::new(&state.db);
    let Some(booking) = bookings.find_by_id(booking_id).await? else {
        return Ok(());
    };

    let partner_name = PartnerRepository::new(&state.db)
        .find_by_id(booking.partner_id)
        .await?
        .map(|p| p.subdomain)
        .unwrap_or_else(|| "AIRE".to_string());

    state
        .email
        .send_booking_confirmation(&ConfirmationEmail {
            to: to.to_string(),
            customer_name: customer_name.to_string(),
            resort_name: booking.resort_details.name.clone(),
            partner_name,
            booking_id: booking.id.to_string(),
            itinerary: booking.itinerary_data.unwrap_or_default(),
        })
        .await
}
