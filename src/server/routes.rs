//! Router configuration for the web server.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

/// Headroom above the upload size limit for multipart framing. Files over the
/// limit but within the headroom get a 400 from the upload handler.
const BODY_LIMIT_HEADROOM: usize = 16 * 1024 * 1024;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(BODY_LIMIT_HEADROOM);

    Router::new()
        .route(
            "/api/analyze",
            get(handlers::api_info).post(handlers::analyze),
        )
        .route("/api/upload", post(handlers::upload))
        .route("/api/summary", post(handlers::summary))
        .route("/api/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
