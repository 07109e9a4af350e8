//! Generative model configuration.

use serde::{Deserialize, Serialize};

/// Sampling parameters for one kind of model call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingProfile {
    /// Maximum tokens in response
    pub max_output_tokens: u32,
    /// Temperature for generation (0.0 - 1.0)
    pub temperature: f32,
    /// Nucleus sampling threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl SamplingProfile {
    /// Near-deterministic profile for schema-constrained JSON output.
    pub fn analysis() -> Self {
        Self {
            max_output_tokens: 2048,
            temperature: 0.3,
            top_p: Some(0.8),
        }
    }

    /// Profile for free-text executive summaries.
    pub fn summary() -> Self {
        Self {
            max_output_tokens: 1024,
            temperature: 0.4,
            top_p: None,
        }
    }
}

/// Configuration for the Vertex AI Gemini client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Publisher model name
    #[serde(default = "default_model")]
    pub name: String,
    /// API base URL (defaults to the regional Vertex AI endpoint)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default = "SamplingProfile::analysis")]
    pub analysis: SamplingProfile,
    #[serde(default = "SamplingProfile::summary")]
    pub summary: SamplingProfile,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gemini-1.5-pro-preview-0409".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            endpoint: None,
            analysis: SamplingProfile::analysis(),
            summary: SamplingProfile::summary(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ModelConfig {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `GEMINI_MODEL`: Model name
    /// - `VERTEX_ENDPOINT`: API base URL
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("GEMINI_MODEL") {
            if !val.is_empty() {
                self.name = val;
            }
        }
        if let Ok(val) = std::env::var("VERTEX_ENDPOINT") {
            if !val.is_empty() {
                self.endpoint = Some(val);
            }
        }
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.name = model.to_string();
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.to_string());
        self
    }

    /// Base URL for the given region.
    pub fn base_url(&self, location: &str) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}-aiplatform.googleapis.com", location))
    }
}
