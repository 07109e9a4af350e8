//! Cloud service wiring shared by the CLI and the web server.
//!
//! [`CloudServices`] holds one handle per external service. It is built once
//! at startup; the facades ([`AnalysisService`], [`TextExtractor`],
//! [`DocumentStorage`]) are cheap views over it.

pub mod health;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::analysis::AnalysisService;
use crate::config::{Config, StorageBackend};
use crate::google::{AuthError, GoogleAuth};
use crate::llm::{GeminiClient, GenerativeModel, ModelConfig};
use crate::ocr::{TextDetector, TextExtractor, VisionClient};
use crate::storage::{BlobStore, DocumentStorage, GcsClient, PlaceholderStore, StorageError};

pub use health::{check_services, ServiceHealth};

/// Errors building the service context.
#[derive(Debug, thiserror::Error)]
pub enum ServiceInitError {
    #[error("Failed to resolve Google credentials: {0}")]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Handles to the generative model, OCR and blob storage services.
#[derive(Clone)]
pub struct CloudServices {
    pub model: Arc<dyn GenerativeModel>,
    pub detector: Arc<dyn TextDetector>,
    pub store: Arc<dyn BlobStore>,
    url_ttl: Duration,
    model_config: ModelConfig,
}

impl CloudServices {
    /// Build service clients from configuration.
    pub fn from_config(config: &Config) -> Result<Self, ServiceInitError> {
        let auth = Arc::new(GoogleAuth::from_config(&config.google)?);
        info!(
            "Google credentials: {} (project {}, location {})",
            auth.source_name(),
            config.google.project_id,
            config.google.location
        );

        let model: Arc<dyn GenerativeModel> =
            Arc::new(GeminiClient::new(&config.model, &config.google, auth.clone()));
        let detector: Arc<dyn TextDetector> = Arc::new(VisionClient::new(&config.vision, auth.clone()));

        let store: Arc<dyn BlobStore> = match config.storage.backend {
            StorageBackend::Placeholder => Arc::new(PlaceholderStore),
            StorageBackend::Gcs => Arc::new(GcsClient::new(&config.storage, auth)?),
        };
        info!(
            "Upload storage: {} (bucket {})",
            config.storage.backend.as_str(),
            store.bucket()
        );

        Ok(Self::new(model, detector, store).with_config(config))
    }

    /// Assemble from existing handles with default settings.
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        detector: Arc<dyn TextDetector>,
        store: Arc<dyn BlobStore>,
    ) -> Self {
        let defaults = Config::default();
        Self {
            model,
            detector,
            store,
            url_ttl: Duration::from_secs(defaults.storage.signed_url_ttl_secs),
            model_config: defaults.model,
        }
    }

    fn with_config(mut self, config: &Config) -> Self {
        self.url_ttl = Duration::from_secs(config.storage.signed_url_ttl_secs);
        self.model_config = config.model.clone();
        self
    }

    pub fn analysis(&self) -> AnalysisService {
        AnalysisService::new(self.model.clone())
            .with_sampling(
                self.model_config.analysis.clone(),
                self.model_config.summary.clone(),
            )
    }

    pub fn extractor(&self) -> TextExtractor {
        TextExtractor::new(self.detector.clone())
    }

    pub fn storage(&self) -> DocumentStorage {
        DocumentStorage::new(self.store.clone(), self.url_ttl)
    }
}
