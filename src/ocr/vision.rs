//! Google Cloud Vision `images:annotate` client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::backend::{OcrError, TextDetector};
use crate::config::VisionConfig;
use crate::google::{api_error_message, GoogleAuth};

/// Vision feature requested for an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionFeature {
    /// Dense text, tuned for documents.
    DocumentText,
    /// Sparse text, tuned for photos and scenes.
    Text,
}

impl DetectionFeature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DocumentText => "DOCUMENT_TEXT_DETECTION",
            Self::Text => "TEXT_DETECTION",
        }
    }
}

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
struct AnnotateImageRequest {
    image: VisionImage,
    features: Vec<VisionFeature>,
}

#[derive(Debug, Serialize)]
struct VisionImage {
    content: String,
}

#[derive(Debug, Serialize)]
struct VisionFeature {
    #[serde(rename = "type")]
    feature_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    full_text_annotation: Option<FullTextAnnotation>,
    #[serde(default)]
    text_annotations: Vec<EntityAnnotation>,
    error: Option<VisionStatus>,
}

#[derive(Debug, Deserialize)]
struct FullTextAnnotation {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EntityAnnotation {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VisionStatus {
    message: String,
}

/// Cloud Vision client.
pub struct VisionClient {
    url: String,
    auth: Arc<GoogleAuth>,
    client: reqwest::Client,
}

impl VisionClient {
    pub fn new(config: &VisionConfig, auth: Arc<GoogleAuth>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            url: format!("{}/v1/images:annotate", config.endpoint.trim_end_matches('/')),
            auth,
            client,
        }
    }

    async fn annotate(
        &self,
        bytes: &[u8],
        feature: DetectionFeature,
    ) -> Result<AnnotateImageResponse, OcrError> {
        let request = AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: VisionImage {
                    content: base64::engine::general_purpose::STANDARD.encode(bytes),
                },
                features: vec![VisionFeature {
                    feature_type: feature.as_str(),
                }],
            }],
        };

        let token = self
            .auth
            .access_token()
            .await
            .map_err(|e| OcrError::OcrFailed(e.to_string()))?;
        debug!("Vision {} on {} bytes", feature.as_str(), bytes.len());

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(|e| OcrError::OcrFailed(format!("HTTP request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(OcrError::OcrFailed(format!(
                "Vision API error ({}): {}",
                status,
                api_error_message(&body)
            )));
        }

        let parsed: AnnotateResponse = resp
            .json()
            .await
            .map_err(|e| OcrError::OcrFailed(format!("Failed to parse response: {}", e)))?;

        let response = parsed.responses.into_iter().next().unwrap_or_default();
        if let Some(error) = &response.error {
            return Err(OcrError::OcrFailed(format!(
                "Vision API error: {}",
                error.message
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl TextDetector for VisionClient {
    async fn detect_document_text(&self, bytes: &[u8]) -> Result<Option<String>, OcrError> {
        let response = self.annotate(bytes, DetectionFeature::DocumentText).await?;
        Ok(response.full_text_annotation.and_then(|a| a.text))
    }

    async fn detect_text(&self, bytes: &[u8]) -> Result<Vec<String>, OcrError> {
        let response = self.annotate(bytes, DetectionFeature::Text).await?;
        Ok(response
            .text_annotations
            .into_iter()
            .filter_map(|a| a.description)
            .collect())
    }
}
