//! Data models for the startup analyst API.

mod document;

pub use document::{DocumentKind, UploadedDocument, PPTX_MIME};
