//! Service health endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use super::super::AppState;
use crate::services::check_services;

/// GET /api/health
///
/// 200 when every service responds, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let health = check_services(&state.services).await;
    let status = if health.overall {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(health))
}
