//! OCR and text extraction module.
//!
//! Text is extracted by Google Cloud Vision. Dense document detection runs
//! first and basic text detection is the fallback for sparse pages.

mod backend;
mod extractor;
mod vision;

pub use backend::{OcrError, TextDetector};
pub use extractor::{ExtractionError, TextExtractor};
pub use vision::{DetectionFeature, VisionClient};
