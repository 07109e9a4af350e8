//! Document upload endpoint.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;
use tracing::info;

use super::super::error::ApiError;
use super::super::AppState;
use crate::models::{DocumentKind, UploadedDocument};

/// A file read from the multipart form.
struct FilePart {
    name: String,
    content_type: String,
    bytes: axum::body::Bytes,
}

fn too_large(max_bytes: usize) -> ApiError {
    ApiError::validation(format!(
        "File too large. Maximum size is {}MB.",
        max_bytes / (1024 * 1024)
    ))
}

fn multipart_error(e: MultipartError, max_bytes: usize) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large(max_bytes)
    } else {
        ApiError::failed("Upload failed", e.body_text())
    }
}

/// Read the first `file` field of the form.
async fn read_file_part(
    multipart: &mut Multipart,
    max_bytes: usize,
) -> Result<Option<FilePart>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, max_bytes))?;
        return Ok(Some(FilePart {
            name,
            content_type,
            bytes,
        }));
    }
    Ok(None)
}

/// POST /api/upload
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let mut multipart =
        multipart.map_err(|rejection| ApiError::failed("Upload failed", rejection.body_text()))?;
    let max_bytes = state.max_upload_bytes;
    let file = read_file_part(&mut multipart, max_bytes)
        .await?
        .ok_or_else(|| ApiError::validation("No file provided"))?;

    let kind = DocumentKind::for_upload(&file.content_type, &file.name).ok_or_else(|| {
        ApiError::validation("Invalid file type. Only PDF and PPTX files are supported.")
    })?;

    if file.bytes.len() > max_bytes {
        return Err(too_large(max_bytes));
    }

    let uploaded_at = Utc::now();
    let key = format!(
        "{}/{}-{}",
        state.key_prefix,
        uploaded_at.timestamp_millis(),
        file.name
    );
    let content_type = if file.content_type.is_empty() {
        mime_guess::from_path(&file.name)
            .first_or_octet_stream()
            .to_string()
    } else {
        file.content_type
    };

    info!("Uploading {} ({} bytes) as {}", file.name, file.bytes.len(), key);
    let stored = state
        .storage
        .upload(&file.bytes, &key, &content_type)
        .await
        .map_err(|e| ApiError::failed("Upload failed", e))?;

    let document = UploadedDocument::new(file.name, kind, stored.url, stored.size, uploaded_at);

    Ok(Json(json!({
        "success": true,
        "document": document,
        "uploadInfo": {
            "fileName": stored.name,
            "bucket": stored.bucket,
            "size": stored.size,
        },
    })))
}
