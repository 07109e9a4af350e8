//! OCR backend abstraction.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR failed: {0}")]
    OcrFailed(String),
}

/// A remote text detection service.
#[async_trait]
pub trait TextDetector: Send + Sync {
    /// Dense document text detection. Returns the aggregate text, if any.
    async fn detect_document_text(&self, bytes: &[u8]) -> Result<Option<String>, OcrError>;

    /// Basic text detection. Returns annotation descriptions, the full text first.
    async fn detect_text(&self, bytes: &[u8]) -> Result<Vec<String>, OcrError>;
}
