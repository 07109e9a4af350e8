//! Document storage for uploaded pitch materials.
//!
//! [`DocumentStorage`] is the facade used by the upload endpoint. It sits on
//! top of a [`BlobStore`]: either Google Cloud Storage or a placeholder store
//! that keeps nothing and hands back a deterministic `demo/` locator.

mod gcs;
mod signing;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::Outcome;
use crate::google::AuthError;

pub use gcs::GcsClient;
pub use signing::{encode_object_path, SignedUrlRequest, MAX_SIGNED_URL_TTL_SECS};

/// Bucket reported by the placeholder store.
pub const PLACEHOLDER_BUCKET: &str = "demo-bucket";

/// Errors from a blob store backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage configuration error: {0}")]
    Config(String),

    #[error("Storage connection error: {0}")]
    Connection(String),

    #[error("Storage API error: {0}")]
    Api(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Upload failure surfaced by [`DocumentStorage::upload`].
#[derive(Debug, Error)]
#[error("File upload failed: {0}")]
pub struct UploadError(pub String);

/// A stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    /// Object key within the bucket.
    pub name: String,
    /// Time-limited read locator.
    pub url: String,
    pub bucket: String,
    pub size: u64,
}

/// Minimal object store operations needed for document uploads.
#[async_trait]
pub trait BlobStore: Send + Sync {
    fn bucket(&self) -> &str;

    /// Store `bytes` under `name`. Objects are private.
    async fn put(&self, name: &str, bytes: &[u8], content_type: &str) -> Result<(), StorageError>;

    /// Read-only URL for `name` valid for `ttl`.
    async fn signed_read_url(&self, name: &str, ttl: Duration) -> Result<String, StorageError>;

    async fn delete(&self, name: &str) -> Result<(), StorageError>;

    /// Cheap reachability check used by the health report.
    async fn probe(&self) -> Result<(), StorageError>;
}

/// Store that keeps nothing. Used until a real bucket is configured.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderStore;

#[async_trait]
impl BlobStore for PlaceholderStore {
    fn bucket(&self) -> &str {
        PLACEHOLDER_BUCKET
    }

    async fn put(&self, name: &str, bytes: &[u8], _content_type: &str) -> Result<(), StorageError> {
        info!("Placeholder storage: skipping upload of {} ({} bytes)", name, bytes.len());
        Ok(())
    }

    async fn signed_read_url(&self, name: &str, _ttl: Duration) -> Result<String, StorageError> {
        Ok(format!("demo/{}", name))
    }

    async fn delete(&self, _name: &str) -> Result<(), StorageError> {
        Ok(())
    }

    async fn probe(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Upload and delete facade over a [`BlobStore`].
#[derive(Clone)]
pub struct DocumentStorage {
    store: Arc<dyn BlobStore>,
    url_ttl: Duration,
}

impl DocumentStorage {
    pub fn new(store: Arc<dyn BlobStore>, url_ttl: Duration) -> Self {
        Self { store, url_ttl }
    }

    pub fn bucket(&self) -> &str {
        self.store.bucket()
    }

    /// Store a document privately and return a signed read locator for it.
    pub async fn upload(
        &self,
        bytes: &[u8],
        name: &str,
        content_type: &str,
    ) -> Result<StoredObject, UploadError> {
        self.store
            .put(name, bytes, content_type)
            .await
            .map_err(|e| UploadError(e.to_string()))?;

        let url = match self.store.signed_read_url(name, self.url_ttl).await {
            Ok(url) => url,
            Err(e) => {
                // The object is unreachable without a locator
                if let Some(reason) = self.remove(name).await.reason() {
                    warn!("Orphaned upload {} left in place: {}", name, reason);
                }
                return Err(UploadError(e.to_string()));
            }
        };

        info!("File uploaded successfully: {}", name);
        Ok(StoredObject {
            name: name.to_string(),
            url,
            bucket: self.store.bucket().to_string(),
            size: bytes.len() as u64,
        })
    }

    /// Delete a stored document. Failures are logged and reported as
    /// [`Outcome::Failed`], never raised.
    pub async fn remove(&self, name: &str) -> Outcome<()> {
        match self.store.delete(name).await {
            Ok(()) => {
                info!("File deleted successfully: {}", name);
                Outcome::Succeeded(())
            }
            Err(e) => {
                warn!("Failed to delete {}: {}", name, e);
                Outcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub async fn probe(&self) -> Result<(), StorageError> {
        self.store.probe().await
    }
}
