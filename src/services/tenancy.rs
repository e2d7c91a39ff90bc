//! Tenant scoping capability
//!
//! Resolves the current session's verified user identity to exactly one
//! partner id. The returned id is the only legitimate scoping value for that
//! session; it must never be replaced by a client-supplied field on mutating
//! operations. Zero matches fail closed: there is no default partner and no
//! unscoped fallback.

use tracing::debug;
use uuid::Uuid;

use crate::db::{DbPool, PartnerRepository};
use crate::models::Partner;
use crate::utils::{AppError, AppResult};

/// Resolve a verified user id to its partner row.
///
/// The error is deliberately generic: callers must not be able to tell
/// "no such user" from "user without a partner".
pub async fn resolve_partner(pool: &DbPool, user_id: &str) -> AppResult<Partner> {
    let repo = PartnerRepository::new(pool);
    let partner = repo
        .find_by_user_id(user_id)
        .await
        .map_err(|e| {
            tracing::error!("Partner resolution failed: {}", e);
            AppError::internal("Failed to resolve partner")
        })?
        .ok_or_else(|| AppError::forbidden("Not authorized"))?;

    debug!(partner_id = %partner.id, "Resolved partner for session");
    Ok(partner)
}

/// Resolve a verified user id to its partner id.
pub async fn resolve_partner_id(pool: &DbPool, user_id: &str) -> AppResult<Uuid> {
    Ok(resolve_partner(pool, user_id).await?.id)
}
