//! Startup analysis with a generative model.
//!
//! Text goes through three stages: the prompt builder embeds it with a
//! category schema, the model produces JSON, and the normalizer coerces that
//! output into a category-shaped object (or the category default).

mod category;
mod normalize;
mod outcome;
mod prompt;
mod service;

pub use category::{unknown_fallback, AnalysisCategory, FALLBACK_CONFIDENCE};
pub use normalize::{normalize, strip_code_fences};
pub use outcome::Outcome;
pub use prompt::{build_prompt, build_summary_prompt, truncate_chars, MAX_PROMPT_TEXT_CHARS};
pub use service::{AnalysisError, AnalysisResult, AnalysisService, SUMMARY_FALLBACK};
