//! Reachability checks for the external services.

use base64::Engine;
use serde::Serialize;
use tracing::{info, warn};

use super::CloudServices;
use crate::llm::SamplingProfile;

/// Prompt sent to the model by the health check.
pub const PROBE_PROMPT: &str = "Hello, this is a test.";

/// A 1x1 transparent PNG used to exercise text detection.
const PROBE_IMAGE_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// Per-service health report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceHealth {
    pub storage: bool,
    pub vision: bool,
    #[serde(rename = "vertexAI")]
    pub vertex_ai: bool,
    /// All of the above.
    pub overall: bool,
}

/// Probe storage, OCR and the generative model. Each probe's failure is
/// logged and recorded as `false`; the check itself never fails.
pub async fn check_services(services: &CloudServices) -> ServiceHealth {
    info!("Running cloud services health check");

    let storage = match services.store.probe().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Storage health check failed: {}", e);
            false
        }
    };

    let vision = match base64::engine::general_purpose::STANDARD.decode(PROBE_IMAGE_BASE64) {
        Ok(image) => match services.detector.detect_text(&image).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Vision health check failed: {}", e);
                false
            }
        },
        Err(e) => {
            warn!("Vision probe image is invalid: {}", e);
            false
        }
    };

    let vertex_ai = match services
        .model
        .generate(PROBE_PROMPT, &SamplingProfile::summary())
        .await
    {
        Ok(text) if !text.is_empty() => true,
        Ok(_) => {
            warn!("Model health check returned no text");
            false
        }
        Err(e) => {
            warn!("Model health check failed: {}", e);
            false
        }
    };

    let overall = storage && vision && vertex_ai;
    if overall {
        info!("All cloud services are operational");
    } else {
        warn!("Some cloud services are not available");
    }

    ServiceHealth {
        storage,
        vision,
        vertex_ai,
        overall,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{GenerativeModel, LlmError};
    use crate::ocr::{OcrError, TextDetector};
    use crate::storage::PlaceholderStore;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EchoModel(Option<&'static str>);

    #[async_trait]
    impl GenerativeModel for EchoModel {
        fn model_name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, prompt: &str, _s: &SamplingProfile) -> Result<String, LlmError> {
            assert_eq!(prompt, PROBE_PROMPT);
            self.0
                .map(str::to_string)
                .ok_or_else(|| LlmError::Connection("refused".to_string()))
        }
    }

    struct PngDetector;

    #[async_trait]
    impl TextDetector for PngDetector {
        async fn detect_document_text(&self, _bytes: &[u8]) -> Result<Option<String>, OcrError> {
            Ok(None)
        }

        async fn detect_text(&self, bytes: &[u8]) -> Result<Vec<String>, OcrError> {
            if bytes.starts_with(b"\x89PNG") {
                Ok(vec![])
            } else {
                Err(OcrError::OcrFailed("not an image".to_string()))
            }
        }
    }

    #[tokio::test]
    async fn test_all_services_healthy() {
        let services = CloudServices::new(
            Arc::new(EchoModel(Some("Hi!"))),
            Arc::new(PngDetector),
            Arc::new(PlaceholderStore),
        );
        let health = check_services(&services).await;

        assert!(health.storage && health.vision && health.vertex_ai);
        assert!(health.overall);
    }

    #[tokio::test]
    async fn test_model_failure_clears_overall() {
        let services = CloudServices::new(
            Arc::new(EchoModel(None)),
            Arc::new(PngDetector),
            Arc::new(PlaceholderStore),
        );
        let health = check_services(&services).await;

        assert!(health.storage && health.vision);
        assert!(!health.vertex_ai);
        assert!(!health.overall);

        let json = serde_json::to_value(health).unwrap();
        assert_eq!(json["vertexAI"], false);
    }

    #[tokio::test]
    async fn test_empty_model_reply_is_unhealthy() {
        let services = CloudServices::new(
            Arc::new(EchoModel(Some(""))),
            Arc::new(PngDetector),
            Arc::new(PlaceholderStore),
        );
        assert!(!check_services(&services).await.vertex_ai);
    }
}
