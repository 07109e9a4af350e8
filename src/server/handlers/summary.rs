//! Executive summary endpoint.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use super::super::error::ApiError;
use super::super::AppState;
use super::parse_json_body;
use crate::analysis::SUMMARY_FALLBACK;

/// POST /api/summary
///
/// Model failures never surface as errors; the fallback text is returned
/// with `degraded: true`.
pub async fn summary(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let body = parse_json_body(&body)?;
    let analysis = match body.get("analysis") {
        Some(Value::Null) | None => {
            return Err(ApiError::validation(
                "Analysis results are required for summary",
            ))
        }
        Some(analysis) => analysis,
    };

    let outcome = state.analysis.summarize(analysis).await;
    let degraded = !outcome.succeeded();
    let summary = outcome
        .into_value()
        .unwrap_or_else(|| SUMMARY_FALLBACK.to_string());

    Ok(Json(json!({
        "success": true,
        "summary": summary,
        "degraded": degraded,
    })))
}
