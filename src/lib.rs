//! AIRE Marketplace Library
//!
//! This crate provides the core functionality for the AIRE multi-tenant
//! resort-booking marketplace: tenant-isolated request routing, scoped data
//! access, booking pricing and payment settlement.

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::Router;

pub mod api;
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use db::DbPool;
pub use middleware::{auth_middleware, AuthUser, Claims};

use services::{ActionThrottle, EmailService, ItineraryGenerator, StripeGateway};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Database connection pool
    pub db: DbPool,
    /// Itinerary generation collaborator
    pub itinerary: Arc<dyn ItineraryGenerator>,
    /// Payment gateway client
    pub payments: Arc<StripeGateway>,
    /// Transactional email service
    pub email: Arc<EmailService>,
    /// Per-partner action throttle
    pub throttle: Arc<ActionThrottle>,
}

/// Build the application router: tenant storefront routes, public API and
/// the authenticated dashboard.
///
/// The tenant gatekeeper is NOT part of this router. Its URI rewrite must
/// influence which route matches, and middleware added with `Router::layer`
/// only runs after routing, so callers wrap the finished router instead:
///
/// ```ignore
/// let app = axum::middleware::from_fn_with_state(state.clone(), tenant_gatekeeper)
///     .layer(build_router(state));
/// ```
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::storefront_routes())
        .nest("/api/v1", api::public_routes())
        .nest(
            "/api/v1/dashboard",
            api::dashboard_routes().layer(from_fn_with_state(
                state.clone(),
                middleware::auth::auth_middleware,
            )),
        )
        .with_state(state)
}
