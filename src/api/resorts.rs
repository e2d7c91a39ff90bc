//! Resort dashboard endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::db::{NewResort, ResortRepository};
use crate::middleware::AuthUser;
use crate::models::{CreateResortRequest, Resort};
use crate::services::tenancy;
use crate::utils::validation::parse_amenities;
use crate::utils::{AppError, AppResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/resorts", get(list_resorts).post(create_resort))
        .route("/resorts/{id}", axum::routing::delete(delete_resort))
}

async fn list_resorts(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<Vec<Resort>>> {
    let partner_id = tenancy::resolve_partner_id(&state.db, &auth_user.user_id).await?;

    let resorts = ResortRepository::new(&state.db)
        .list_for_partner(partner_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list resorts: {}", e);
            AppError::internal("Failed to list resorts")
        })?;

    Ok(Json(resorts))
}

async fn create_resort(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateResortRequest>,
) -> AppResult<(StatusCode, Json<Resort>)> {
    payload.validate()?;

    let partner_id = tenancy::resolve_partner_id(&state.db, &auth_user.user_id).await?;

    let resort = ResortRepository::new(&state.db)
        .create(
            partner_id,
            &NewResort {
                name: payload.name.clone(),
                location: payload.location.clone(),
                description: payload.description.clone(),
                // Dashboard input is whole currency units; rows store cents
                base_price_per_night: payload.base_price_per_night * 100,
                amenities: parse_amenities(&payload.amenities),
                image_url: payload
                    .image_url
                    .as_deref()
                    .map(str::trim)
                    .filter(|u| !u.is_empty())
                    .map(String::from),
            },
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to create resort: {}", e);
            AppError::internal("Failed to create resort")
        })?;

    Ok((StatusCode::CREATED, Json(resort)))
}

/// Compound-predicate delete: a resort owned by another partner is reported
/// exactly like a missing one.
async fn delete_resort(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let partner_id = tenancy::resolve_partner_id(&state.db, &auth_user.user_id).await?;

    let deleted = ResortRepository::new(&state.db)
        .delete_for_partner(id, partner_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete resort: {}", e);
            AppError::internal("Failed to delete resort")
        })?;

    if !deleted {
        return Err(AppError::not_found("Resort not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
