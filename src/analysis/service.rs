//! Analysis orchestration: prompt, model call, normalization.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use super::category::AnalysisCategory;
use super::normalize::normalize;
use super::outcome::Outcome;
use super::prompt::{build_prompt, build_summary_prompt};
use crate::llm::{GenerativeModel, SamplingProfile};

/// Text returned in place of an executive summary the model could not produce.
pub const SUMMARY_FALLBACK: &str =
    "Executive summary generation failed. Please review individual analysis sections.";

/// Errors raised by [`AnalysisService::analyze`].
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("AI analysis failed: {0}")]
    Failed(String),
}

/// One category's structured analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub category: AnalysisCategory,
    /// Category-shaped object returned by the model, or its default.
    pub data: Value,
    /// Set when the model output could not be parsed and `data` is the default.
    pub degraded: Option<String>,
}

impl AnalysisResult {
    /// The `confidence` field of the result, when it is a number.
    pub fn confidence(&self) -> Option<f64> {
        self.data.get("confidence").and_then(Value::as_f64)
    }
}

/// Runs category analyses and executive summaries against a generative model.
#[derive(Clone)]
pub struct AnalysisService {
    model: Arc<dyn GenerativeModel>,
    analysis_sampling: SamplingProfile,
    summary_sampling: SamplingProfile,
}

impl AnalysisService {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            model,
            analysis_sampling: SamplingProfile::analysis(),
            summary_sampling: SamplingProfile::summary(),
        }
    }

    /// Override the sampling parameters used for each call kind.
    pub fn with_sampling(mut self, analysis: SamplingProfile, summary: SamplingProfile) -> Self {
        self.analysis_sampling = analysis;
        self.summary_sampling = summary;
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Analyze startup text for one category.
    ///
    /// Model call failures are raised. Unparseable model output is not: it
    /// yields the category default, flagged as degraded.
    pub async fn analyze(
        &self,
        text: &str,
        category: AnalysisCategory,
    ) -> Result<AnalysisResult, AnalysisError> {
        info!(
            "Running {} analysis on {} characters",
            category,
            text.chars().count()
        );
        let prompt = build_prompt(text, Some(category));

        let raw = self
            .model
            .generate(&prompt, &self.analysis_sampling)
            .await
            .map_err(|e| AnalysisError::Failed(e.to_string()))?;

        let outcome = normalize(&raw, Some(category));
        let degraded = outcome.reason().map(str::to_string);
        let data = outcome.into_value().unwrap_or_else(|| category.fallback());

        Ok(AnalysisResult {
            category,
            data,
            degraded,
        })
    }

    /// Produce a short investor-facing narrative from prior analysis results.
    ///
    /// Never raises: a failed or empty generation degrades to [`SUMMARY_FALLBACK`].
    pub async fn summarize(&self, analysis: &Value) -> Outcome<String> {
        let prompt = build_summary_prompt(analysis);

        match self.model.generate(&prompt, &self.summary_sampling).await {
            Ok(text) if !text.trim().is_empty() => Outcome::Succeeded(text),
            Ok(_) => {
                warn!("Summary generation returned no text");
                Outcome::Degraded {
                    value: SUMMARY_FALLBACK.to_string(),
                    reason: "model returned no text".to_string(),
                }
            }
            Err(e) => {
                warn!("Summary generation failed: {}", e);
                Outcome::Degraded {
                    value: SUMMARY_FALLBACK.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }
}
