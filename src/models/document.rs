//! Uploaded pitch document model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// MIME type of PowerPoint OOXML presentations.
pub const PPTX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Kind of an uploaded document, derived from its MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Pptx,
    /// Accepted by filename only; the MIME type said nothing useful.
    Document,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Pptx => "pptx",
            Self::Document => "document",
        }
    }

    /// Kind for a supported MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/pdf" => Some(Self::Pdf),
            PPTX_MIME => Some(Self::Pptx),
            _ => None,
        }
    }

    /// Kind for an upload, or `None` when neither the MIME type nor the
    /// filename extension is supported.
    pub fn for_upload(mime: &str, filename: &str) -> Option<Self> {
        if let Some(kind) = Self::from_mime(mime) {
            return Some(kind);
        }
        let lower = filename.to_lowercase();
        if lower.ends_with(".pdf") || lower.ends_with(".pptx") {
            Some(Self::Document)
        } else {
            None
        }
    }
}

/// A document accepted by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocument {
    /// `doc-{unix_millis}`.
    pub id: String,
    /// Original filename.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    /// Storage locator.
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
    /// Set once text extraction has run.
    pub processed: bool,
    pub size: u64,
}

impl UploadedDocument {
    pub fn new(
        name: impl Into<String>,
        kind: DocumentKind,
        url: impl Into<String>,
        size: u64,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: format!("doc-{}", uploaded_at.timestamp_millis()),
            name: name.into(),
            kind,
            url: url.into(),
            uploaded_at,
            processed: false,
            size,
        }
    }
}
