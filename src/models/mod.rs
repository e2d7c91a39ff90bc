//! Domain models

mod booking;
mod partner;
mod resort;

pub use booking::{
    Booking, BookingStatus, CheckoutResponse, CreateBookingRequest, DiningPlan, ItineraryDay,
};
pub use partner::{
    CreatePartnerRequest, Partner, PartnerOnboarding, PartnerStorefront,
    UpdatePartnerSettingsRequest, DEFAULT_BRAND_TONE, DEFAULT_MARKUP_RATE,
};
pub use resort::{CreateResortRequest, Resort, ResortSnapshot};
