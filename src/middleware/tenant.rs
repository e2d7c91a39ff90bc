//! Tenant gatekeeper middleware
//!
//! Single chokepoint executed before any route handler. Validates the Host
//! header against the allow-list, classifies it into a tenant candidate,
//! verifies the candidate against the partner directory and rewrites the
//! request into the tenant-scoped namespace. Unknown subdomains are rejected
//! outright; falling through to default routing would let an attacker probe
//! which subdomains exist.
//!
//! The rewritten path segment is only trusted for read-only storefront
//! display. Mutating actions re-resolve partner identity from the
//! authenticated session (`services::tenancy`).

use axum::{
    extract::{Request, State},
    http::{header::HOST, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::warn;

use crate::db::PartnerRepository;
use crate::middleware::auth::{bearer_token, verify_session_token};
use crate::utils::host::{host_allowed, resolve_host, HostClass};
use crate::AppState;

/// Path prefixes that require an authenticated session before any
/// tenant handling happens.
const PROTECTED_PREFIXES: &[&str] = &["/dashboard", "/api/v1/dashboard"];

/// Namespace all tenant traffic is rewritten into.
const TENANT_PREFIX: &str = "/tenants/";

fn is_protected_path(path: &str) -> bool {
    PROTECTED_PREFIXES
        .iter()
        .any(|prefix| path == *prefix || path.starts_with(&format!("{}/", prefix)))
}

/// Outermost middleware: host validation, tenant resolution, URL rewrite.
pub async fn tenant_gatekeeper(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    // Already inside the tenant namespace: pass through unchanged so the
    // rewrite is never applied twice.
    if path.starts_with(TENANT_PREFIX) {
        return next.run(req).await;
    }

    // Protected paths need a session before anything else.
    if is_protected_path(&path) {
        let has_session = bearer_token(req.headers())
            .and_then(|token| verify_session_token(token, &state.config.auth.jwt_secret))
            .is_some();
        if !has_session {
            return Redirect::temporary(&state.config.auth.sign_in_url).into_response();
        }
    }

    let host = req
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    // Reject spoofed hosts before they can feed the resolver.
    let allowed = state.config.tenancy.allowed_host_patterns();
    if !host_allowed(&host, &allowed) {
        warn!(host = %host, "Invalid host header");
        return (StatusCode::BAD_REQUEST, "Invalid host").into_response();
    }

    let candidate = match resolve_host(
        &host,
        &state.config.tenancy.base_domain,
        &state.config.tenancy.platform_roots,
    ) {
        HostClass::None | HostClass::Reserved => return next.run(req).await,
        HostClass::Tenant(candidate) => candidate,
    };

    // The candidate is untrusted input until the directory lookup succeeds.
    let repo = PartnerRepository::new(&state.db);
    match repo.find_by_subdomain(&candidate).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!(subdomain = %candidate, "Subdomain spoofing attempt");
            return (StatusCode::NOT_FOUND, "Subdomain not found").into_response();
        }
        Err(err) => {
            warn!(subdomain = %candidate, error = %err, "Tenant directory lookup failed");
            return (StatusCode::SERVICE_UNAVAILABLE, "Service unavailable").into_response();
        }
    }

    match rewrite_uri(req.uri(), &candidate) {
        Some(uri) => *req.uri_mut() = uri,
        None => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "Rewrite failed").into_response();
        }
    }

    next.run(req).await
}

/// Prefix the request path with `/tenants/{subdomain}`, preserving the query.
fn rewrite_uri(uri: &Uri, subdomain: &str) -> Option<Uri> {
    let path_and_query = match uri.query() {
        Some(query) => format!("/tenants/{}{}?{}", subdomain, uri.path(), query),
        None => format!("/tenants/{}{}", subdomain, uri.path()),
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse().ok()?);
    Uri::from_parts(parts).ok()
}
