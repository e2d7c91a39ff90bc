//! Middleware components
//!
//! This module contains middleware for:
//! - Session authentication (JWT)
//! - Tenant resolution and request rewriting

pub mod auth;
pub mod tenant;

pub use auth::{auth_middleware, AuthUser, Claims};
pub use tenant::tenant_gatekeeper;
