//! Category analysis endpoint.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tracing::info;

use super::super::error::ApiError;
use super::super::AppState;
use super::parse_json_body;
use crate::analysis::AnalysisCategory;

/// Shortest text accepted for analysis, in characters.
pub const MIN_TEXT_CHARS: usize = 50;
/// Longest text accepted for analysis, in characters.
pub const MAX_TEXT_CHARS: usize = 50_000;

/// Non-empty string field of a JSON object.
fn string_field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Validate an analysis request, returning its text and category.
fn validate(body: &Value) -> Result<(&str, AnalysisCategory), ApiError> {
    let text = string_field(body, "text")
        .ok_or_else(|| ApiError::validation("Text content is required for analysis"))?;
    let type_name = string_field(body, "analysisType")
        .ok_or_else(|| ApiError::validation("Analysis type is required"))?;

    let category = AnalysisCategory::from_str(type_name).ok_or_else(|| ApiError::Validation {
        error: "Invalid analysis type".to_string(),
        valid_types: Some(AnalysisCategory::names()),
    })?;

    let length = text.chars().count();
    if length < MIN_TEXT_CHARS {
        return Err(ApiError::validation(
            "Text content too short. Please provide more detailed information.",
        ));
    }
    if length > MAX_TEXT_CHARS {
        return Err(ApiError::validation(
            "Text content too long. Maximum 50,000 characters allowed.",
        ));
    }

    Ok((text, category))
}

/// The result's confidence, or `"unknown"` when it is absent, null, false,
/// zero or an empty string.
fn confidence_field(result: &Value) -> Value {
    match result.get("confidence") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => json!("unknown"),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => json!("unknown"),
        Some(Value::String(s)) if s.is_empty() => json!("unknown"),
        Some(value) => value.clone(),
    }
}

/// POST /api/analyze
pub async fn analyze(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let body = parse_json_body(&body)?;
    let (text, category) = validate(&body)?;
    let text_length = text.chars().count();

    info!("Analyzing {} data ({} characters)", category, text_length);
    let result = state
        .analysis
        .analyze(text, category)
        .await
        .map_err(|e| ApiError::failed("Analysis failed", e))?;
    info!("Analysis completed for {}", category);

    Ok(Json(json!({
        "success": true,
        "analysisType": category,
        "metadata": {
            "textLength": text_length,
            "processedAt": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "model": state.analysis.model_name(),
            "confidence": confidence_field(&result.data),
        },
        "result": result.data,
    })))
}

/// GET /api/analyze
pub async fn api_info() -> impl IntoResponse {
    Json(json!({
        "message": "AI Startup Analyst API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "analyze": "POST /api/analyze - Analyze startup documents",
            "upload": "POST /api/upload - Upload documents to Cloud Storage",
            "summary": "POST /api/summary - Generate an executive summary from analysis results",
            "health": "GET /api/health - Check Google Cloud service availability",
        },
        "powered_by": "Google Cloud AI",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_order() {
        let err = validate(&json!({"analysisType": "bogus"})).unwrap_err();
        assert_eq!(err, ApiError::validation("Text content is required for analysis"));

        let err = validate(&json!({"text": 42, "analysisType": "team"})).unwrap_err();
        assert_eq!(err, ApiError::validation("Text content is required for analysis"));

        let err = validate(&json!({"text": "short"})).unwrap_err();
        assert_eq!(err, ApiError::validation("Analysis type is required"));

        let err = validate(&json!({"text": "short", "analysisType": "Team"})).unwrap_err();
        assert!(matches!(err, ApiError::Validation { valid_types: Some(ref v), .. } if v.len() == 6));
    }

    #[test]
    fn test_validate_counts_characters() {
        let text = "é".repeat(50);
        assert!(text.len() > 50);
        let (_, category) = validate(&json!({"text": text, "analysisType": "market"})).unwrap();
        assert_eq!(category, AnalysisCategory::Market);

        let err = validate(&json!({"text": "é".repeat(49), "analysisType": "market"})).unwrap_err();
        assert_eq!(
            err,
            ApiError::validation("Text content too short. Please provide more detailed information.")
        );
    }

    #[test]
    fn test_confidence_field() {
        assert_eq!(confidence_field(&json!({"confidence": 85})), json!(85));
        assert_eq!(confidence_field(&json!({"confidence": 0})), json!("unknown"));
        assert_eq!(confidence_field(&json!({"confidence": 0.0})), json!("unknown"));
        assert_eq!(confidence_field(&json!({"confidence": "high"})), json!("high"));
        assert_eq!(confidence_field(&json!({"confidence": ""})), json!("unknown"));
        assert_eq!(confidence_field(&json!({"confidence": null})), json!("unknown"));
        assert_eq!(confidence_field(&json!({})), json!("unknown"));
    }
}
