//! Booking engine
//!
//! Orchestrates checkout initiation: verifies the resort belongs to the
//! claimed partner (a two-key check, trusting neither id alone), prices the
//! stay, generates the itinerary synchronously, persists the pending booking
//! with a resort snapshot, and requests a hosted checkout session. A gateway
//! failure after the insert aborts the request; the pending row it leaves
//! behind is an accepted, recoverable state.

use uuid::Uuid;

use crate::db::{BookingRepository, NewBooking, PartnerRepository, ResortRepository};
use crate::models::{Booking, CreateBookingRequest};
use crate::services::itinerary::ItineraryRequest;
use crate::services::payments::CheckoutParams;
use crate::services::pricing;
use crate::utils::validation::parse_kids_ages;
use crate::utils::{AppError, AppResult};
use crate::AppState;

pub const DEFAULT_NIGHTS: i64 = 5;

/// A created booking plus where to send the customer next.
#[derive(Debug, Clone)]
pub struct BookingOutcome {
    pub booking: Booking,
    pub checkout_url: String,
}

/// Create a booking for the partner claimed by the storefront.
///
/// `partner_id` comes from the request path's subdomain; it is only accepted
/// because the resort lookup below re-verifies ownership against it.
pub async fn create_booking(
    state: &AppState,
    partner_id: Uuid,
    request: &CreateBookingRequest,
) -> AppResult<BookingOutcome> {
    let nights = request.nights.unwrap_or(DEFAULT_NIGHTS);
    if nights <= 0 {
        return Err(AppError::bad_request("Night count must be a positive integer"));
    }

    let partners = PartnerRepository::new(&state.db);
    let partner = partners
        .find_by_id(partner_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load partner for booking: {}", e);
            AppError::internal("Failed to create booking")
        })?
        .ok_or_else(|| AppError::not_found("Partner not found"))?;

    // Two-key check; a resort under another partner reads the same as a
    // missing resort.
    let resorts = ResortRepository::new(&state.db);
    let resort = resorts
        .find_for_partner(request.resort_id, partner.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load resort for booking: {}", e);
            AppError::internal("Failed to create booking")
        })?
        .ok_or_else(|| AppError::not_found("Resort not found"))?;

    let quote = pricing::quote(resort.base_price_per_night, nights, partner.markup_rate);

    let kids_ages = request
        .kids_ages
        .as_deref()
        .map(parse_kids_ages)
        .unwrap_or_default();

    let snapshot = resort.snapshot();
    let itinerary_request = ItineraryRequest::new(
        &snapshot,
        nights,
        &kids_ages,
        &partner.brand_tone,
        &partner.subdomain,
    );
    // Synchronous by contract; the generator degrades to its fallback rather
    // than propagate a hang into the write path.
    let itinerary = state.itinerary.generate(&itinerary_request).await;

    let bookings = BookingRepository::new(&state.db);
    let booking = bookings
        .insert(&NewBooking {
            partner_id: partner.id,
            total_price: quote.total_price,
            resort_details: snapshot,
            itinerary_data: itinerary,
            kids_ages: if kids_ages.is_empty() {
                None
            } else {
                Some(kids_ages)
            },
        })
        .await
        .map_err(|e| {
            tracing::error!("Failed to persist booking: {}", e);
            AppError::internal("Failed to create booking")
        })?;

    let payout_account = if partner.has_real_payout_account() {
        partner.stripe_account_id.clone()
    } else {
        None
    };

    let session = state
        .payments
        .create_checkout_session(&CheckoutParams {
            booking_id: booking.id,
            resort_name: resort.name.clone(),
            description: format!("{} nights at {}", nights, resort.location),
            total_price: quote.total_price,
            base_price: quote.base_price,
            customer_email: request.customer_email.clone(),
            payout_account,
            app_url: state.config.tenancy.app_url.clone(),
        })
        .await?;

    let checkout_url = session.url.unwrap_or_else(|| {
        format!("{}/success/{}", state.config.tenancy.app_url, booking.id)
    });

    Ok(BookingOutcome {
        booking,
        checkout_url,
    })
}
