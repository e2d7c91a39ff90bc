//! Health check endpoints

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::utils::AppResult;
use crate::AppState;

/// Basic liveness check
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness check: verifies database connectivity
pub async fn readiness(State(state): State<AppState>) -> AppResult<Json<Value>> {
    sqlx::query("SELECT 1").fetch_one(&state.db).await?;

    Ok(Json(json!({
        "status": "ready",
        "components": { "database": "ok" },
    })))
}
