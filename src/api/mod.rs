//! API routes and handlers

use axum::{routing::get, Router};

use crate::AppState;

mod health;
mod partners;
mod resorts;
mod tenants;
mod webhooks;

pub use health::*;

/// Public API routes (no authentication required)
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // Health check endpoints
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness))
        // Webhook endpoints (use signature verification instead of auth)
        .nest("/webhooks", webhooks::routes())
}

/// Dashboard API routes (authentication required)
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .merge(partners::routes())
        .merge(resorts::routes())
}

/// Tenant storefront routes, matched after the gatekeeper rewrite.
/// Registered at the router root with absolute `/tenants/...` paths.
pub fn storefront_routes() -> Router<AppState> {
    tenants::routes()
}
