//! Business logic services

pub mod booking;
pub mod email;
pub mod itinerary;
pub mod payments;
pub mod pricing;
pub mod tenancy;
pub mod throttle;

pub use email::EmailService;
pub use itinerary::{GeminiGenerator, ItineraryGenerator};
pub use payments::StripeGateway;
pub use throttle::ActionThrottle;
