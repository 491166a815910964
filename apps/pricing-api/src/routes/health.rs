//! Health check endpoint. Unauthenticated.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub server_time: String,
}

/// `200` when the database answers, `503` otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, code, database) = if state.db.health_check().await {
        ("ok", StatusCode::OK, "connected")
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE, "unreachable")
    };

    (
        code,
        Json(HealthResponse {
            status,
            database,
            server_time: Utc::now().to_rfc3339(),
        }),
    )
}
