//! Session-token authentication middleware
//!
//! Identity verification happens at the external provider; what arrives here
//! is a signed session token whose subject is the verified user id. This
//! module validates the token and exposes the subject as `AuthUser`. Partner
//! resolution from that subject is a separate step (`services::tenancy`);
//! the user id alone carries no tenant scope.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{utils::error::ErrorResponse, AppState};

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (verified user id from the identity provider)
    pub sub: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Token ID
    pub jti: String,
}

/// Authenticated user information extracted from the session token
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Verified user id; the only input ever fed to partner resolution
    pub user_id: String,
}

/// Extractor for AuthUser from request extensions
///
/// Allows using AuthUser as a handler parameter after auth middleware has run.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().cloned().ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new(
                    "unauthorized",
                    "Authentication required",
                )),
            )
        })
    }
}

/// Create a session token for a verified user id
pub fn create_session_token(
    user_id: &str,
    secret: &str,
    expiry_hours: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiry_hours as i64);

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Decode and validate a session token, returning its claims
pub fn verify_session_token(token: &str, secret: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}

/// Extract the bearer token from request headers, if any
pub fn bearer_token(parts: &axum::http::HeaderMap) -> Option<&str> {
    parts
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Authentication middleware for the protected (dashboard) router
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let claims = bearer_token(req.headers())
        .and_then(|token| verify_session_token(token, &state.config.auth.jwt_secret));

    match claims {
        Some(claims) => {
            req.extensions_mut().insert(AuthUser {
                user_id: claims.sub,
            });
            next.run(req).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(
                "unauthorized",
                "Authentication required",
            )),
        )
            .into_response(),
    }
}
