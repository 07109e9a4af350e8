//! Gemini client for Vertex AI `generateContent`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::config::{ModelConfig, SamplingProfile};
use crate::config::GoogleConfig;
use crate::google::{api_error_message, AuthError, GoogleAuth};

/// Errors that can occur during model calls.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Failed to connect to the model service
    #[error("Connection error: {0}")]
    Connection(String),
    /// API returned an error
    #[error("API error: {0}")]
    Api(String),
    /// Failed to parse response
    #[error("Parse error: {0}")]
    Parse(String),
    /// Could not obtain credentials
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// A hosted text generation model.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Model identifier reported to API clients.
    fn model_name(&self) -> &str;

    /// Generate a completion and return the first candidate's text.
    ///
    /// A response without candidates yields an empty string.
    async fn generate(&self, prompt: &str, sampling: &SamplingProfile) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "topP", skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

impl From<&SamplingProfile> for GeminiGenerationConfig {
    fn from(profile: &SamplingProfile) -> Self {
        Self {
            temperature: profile.temperature,
            max_output_tokens: profile.max_output_tokens,
            top_p: profile.top_p,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

impl GeminiResponse {
    fn first_text(self) -> String {
        self.candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .unwrap_or_default()
    }
}

/// Gemini on Vertex AI.
pub struct GeminiClient {
    model: String,
    url: String,
    auth: Arc<GoogleAuth>,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: &ModelConfig, google: &GoogleConfig, auth: Arc<GoogleAuth>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        let url = format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            config.base_url(&google.location),
            google.project_id,
            google.location,
            config.name
        );

        Self {
            model: config.name.clone(),
            url,
            auth,
            client,
        }
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, sampling: &SamplingProfile) -> Result<String, LlmError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: sampling.into(),
        };

        let token = self.auth.access_token().await?;
        debug!("Calling {} ({} prompt chars)", self.model, prompt.len());

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!(
                "HTTP {}: {}",
                status,
                api_error_message(&body)
            )));
        }

        let response: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(response.first_text())
    }
}
