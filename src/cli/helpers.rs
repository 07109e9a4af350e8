//! Shared helper functions for CLI commands.

use std::path::Path;

use anyhow::Context;
use console::{style, StyledObject};

use crate::ocr::TextExtractor;

/// Whether `bytes` are UTF-8 text rather than a recognizable binary format.
pub fn is_plain_text(bytes: &[u8]) -> bool {
    infer::get(bytes).is_none() && std::str::from_utf8(bytes).is_ok()
}

/// Read a document as text. Text files are used as-is; anything else goes
/// through OCR.
pub async fn read_document_text(extractor: &TextExtractor, path: &Path) -> anyhow::Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if is_plain_text(&bytes) {
        return Ok(String::from_utf8(bytes)?);
    }

    let text = match infer::get(&bytes).map(|kind| kind.mime_type()) {
        Some("application/pdf") => extractor.extract_text_from_pdf(&bytes).await?,
        _ => extractor.extract_text(&bytes).await?,
    };
    Ok(text)
}

/// Green check or red cross.
pub fn status_mark(ok: bool) -> StyledObject<&'static str> {
    if ok {
        style("✓").green()
    } else {
        style("✗").red()
    }
}
