//! HTTP request handlers for the JSON API.

mod analyze;
mod health;
mod summary;
mod upload;

pub use analyze::{analyze, api_info};
pub use health::health;
pub use summary::summary;
pub use upload::upload;

use serde_json::Value;

use super::error::ApiError;

/// Parse a request body as JSON.
pub(super) fn parse_json_body(body: &[u8]) -> Result<Value, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::validation(format!("Invalid JSON body: {}", e)))
}
