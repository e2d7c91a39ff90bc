//! Test data factories

use aire_marketplace::db::{
    BookingRepository, DbPool, NewBooking, NewResort, PartnerRepository, ResortRepository,
};
use aire_marketplace::models::{Booking, Partner, Resort, DEFAULT_BRAND_TONE};
use aire_marketplace::services::itinerary::fallback_itinerary;
use aire_marketplace::services::pricing;
use uuid::Uuid;

pub async fn create_partner(pool: &DbPool, user_id: &str, subdomain: &str) -> Partner {
    create_partner_with_markup(pool, user_id, subdomain, 10).await
}

pub async fn create_partner_with_markup(
    pool: &DbPool,
    user_id: &str,
    subdomain: &str,
    markup_rate: i64,
) -> Partner {
    PartnerRepository::new(pool)
        .create(
            user_id,
            subdomain,
            markup_rate,
            Some("acct_9factory"),
            DEFAULT_BRAND_TONE,
        )
        .await
        .expect("Failed to create test partner")
}

pub async fn create_resort(
    pool: &DbPool,
    partner_id: Uuid,
    name: &str,
    base_price_per_night: i64,
) -> Resort {
    ResortRepository::new(pool)
        .create(
            partner_id,
            &NewResort {
                name: name.to_string(),
                location: "Paradise Island".to_string(),
                description: "A quiet place by the water".to_string(),
                base_price_per_night,
                amenities: vec!["Pool".to_string(), "Spa".to_string()],
                image_url: None,
            },
        )
        .await
        .expect("Failed to create test resort")
}

/// Insert a pending five-night booking with the fallback itinerary.
pub async fn create_booking(pool: &DbPool, partner: &Partner, resort: &Resort) -> Booking {
    let quote = pricing::quote(resort.base_price_per_night, 5, partner.markup_rate);

    BookingRepository::new(pool)
        .insert(&NewBooking {
            partner_id: partner.id,
            total_price: quote.total_price,
            resort_details: resort.snapshot(),
            itinerary_data: fallback_itinerary(&[]),
            kids_ages: None,
        })
        .await
        .expect("Failed to create test booking")
}
