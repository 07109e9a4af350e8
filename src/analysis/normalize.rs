//! Coercion of raw model output into structured analysis JSON.
//!
//! Models are asked for bare JSON but frequently wrap it in markdown code
//! fences. Anything that still fails to parse is replaced by the category's
//! fallback structure so callers always receive the expected top-level keys.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use super::category::{unknown_fallback, AnalysisCategory};
use super::outcome::Outcome;

static FENCE: OnceLock<Regex> = OnceLock::new();

/// Matches ```` ```json ```` and bare ```` ``` ```` markers, each with an optional trailing newline.
fn fence_regex() -> &'static Regex {
    FENCE.get_or_init(|| Regex::new(r"```(?:json)?\n?").expect("fence pattern is valid"))
}

/// Trim the response and drop every code fence marker.
pub fn strip_code_fences(raw: &str) -> String {
    fence_regex().replace_all(raw.trim(), "").into_owned()
}

/// Parse model output for `category`, falling back to its default structure.
///
/// Parsed JSON is returned as-is; field presence and types are not checked.
/// `None` stands for an unrecognized category, whose fallback is `{"confidence": 50}`.
pub fn normalize(raw: &str, category: Option<AnalysisCategory>) -> Outcome<Value> {
    let label = category.map(|c| c.as_str()).unwrap_or("unknown");
    let cleaned = strip_code_fences(raw);

    match serde_json::from_str::<Value>(&cleaned) {
        Ok(value) => {
            debug!("Parsed {} response", label);
            Outcome::Succeeded(value)
        }
        Err(e) => {
            warn!("Failed to parse {} response: {}", label, e);
            debug!("Raw response: {}", raw);
            let value = category
                .map(|c| c.fallback())
                .unwrap_or_else(unknown_fallback);
            Outcome::Degraded {
                value,
                reason: e.to_string(),
            }
        }
    }
}
