//! Text extraction from uploaded documents through a remote OCR service.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use super::backend::{OcrError, TextDetector};

/// Errors that can occur during text extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Text extraction failed: {0}")]
    ExtractionFailed(String),
}

impl From<OcrError> for ExtractionError {
    fn from(e: OcrError) -> Self {
        ExtractionError::ExtractionFailed(e.to_string())
    }
}

/// Extracts plain text, preferring dense document detection.
#[derive(Clone)]
pub struct TextExtractor {
    detector: Arc<dyn TextDetector>,
}

impl TextExtractor {
    pub fn new(detector: Arc<dyn TextDetector>) -> Self {
        Self { detector }
    }

    /// Extract text from document bytes.
    ///
    /// Runs full-document detection first; when that yields no text, falls
    /// back to basic detection and returns its first annotation (or `""`).
    pub async fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        info!("Extracting text from {} bytes", bytes.len());

        if let Some(text) = self.detector.detect_document_text(bytes).await? {
            if !text.is_empty() {
                info!("Text extracted: {} characters", text.chars().count());
                return Ok(text);
            }
        }

        warn!("No text found with document detection, trying basic text detection");
        let text = self
            .detector
            .detect_text(bytes)
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();

        info!("Text extracted (fallback): {} characters", text.chars().count());
        Ok(text)
    }

    /// Extract text from a PDF.
    ///
    /// PDFs go through the same path as any other document; the OCR service
    /// handles rasterization.
    pub async fn extract_text_from_pdf(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        self.extract_text(bytes).await
    }
}
