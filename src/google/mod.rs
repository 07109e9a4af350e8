//! Shared plumbing for Google Cloud REST APIs.

pub mod auth;

pub use auth::{AuthError, GoogleAuth, ServiceAccountKey};

/// OAuth scope granting access to every Cloud API used here.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Extract a readable message from a Google API error body.
///
/// Google wraps errors as `{"error": {"code": 403, "message": "..."}}`; anything
/// else is returned verbatim.
pub fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
