//! Error responses for the JSON API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// An error returned by an API handler.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Malformed request. Always 400.
    Validation {
        error: String,
        valid_types: Option<Vec<&'static str>>,
    },
    /// An external service call failed. Always 500.
    Failed { error: &'static str, details: String },
}

impl ApiError {
    pub fn validation(error: impl Into<String>) -> Self {
        Self::Validation {
            error: error.into(),
            valid_types: None,
        }
    }

    pub fn failed(error: &'static str, details: impl ToString) -> Self {
        Self::Failed {
            error,
            details: details.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Failed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation {
                error,
                valid_types: Some(valid_types),
            } => json!({ "error": error, "validTypes": valid_types }),
            Self::Validation { error, .. } => json!({ "error": error }),
            Self::Failed { error, details } => {
                tracing::error!("{}: {}", error, details);
                json!({ "error": error, "details": details })
            }
        };
        (status, Json(body)).into_response()
    }
}
