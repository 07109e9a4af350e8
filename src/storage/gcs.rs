//! Google Cloud Storage JSON API client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use super::signing::SignedUrlRequest;
use super::{BlobStore, StorageError};
use crate::config::StorageConfig;
use crate::google::{api_error_message, GoogleAuth};

/// Cloud Storage bucket client.
pub struct GcsClient {
    bucket: String,
    endpoint: String,
    scheme: String,
    host: String,
    auth: Arc<GoogleAuth>,
    client: reqwest::Client,
}

impl GcsClient {
    pub fn new(config: &StorageConfig, auth: Arc<GoogleAuth>) -> Result<Self, StorageError> {
        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        let parsed = url::Url::parse(&endpoint)
            .map_err(|e| StorageError::Config(format!("invalid endpoint {}: {}", endpoint, e)))?;
        let host_name = parsed
            .host_str()
            .ok_or_else(|| StorageError::Config(format!("endpoint has no host: {}", endpoint)))?;
        let host = match parsed.port() {
            Some(port) => format!("{}:{}", host_name, port),
            None => host_name.to_string(),
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            bucket: config.bucket.clone(),
            scheme: parsed.scheme().to_string(),
            endpoint,
            host,
            auth,
            client,
        })
    }

    fn object_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/b/{}/o/{}",
            self.endpoint,
            self.bucket,
            urlencoding::encode(name)
        )
    }

    async fn check(resp: reqwest::Response, action: &str) -> Result<reqwest::Response, StorageError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Err(StorageError::Api(format!(
            "{} failed ({}): {}",
            action,
            status,
            api_error_message(&body)
        )))
    }
}

/// Build a `multipart/related` upload body: JSON metadata, then the content.
fn multipart_related_body(boundary: &str, metadata: &serde_json::Value, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(bytes.len() + 512);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n--{boundary}\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

#[async_trait]
impl BlobStore for GcsClient {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(&self, name: &str, bytes: &[u8], content_type: &str) -> Result<(), StorageError> {
        let token = self.auth.access_token().await?;
        let boundary = format!("startup_analyst_{}", Utc::now().timestamp_nanos_opt().unwrap_or_default());
        let metadata = serde_json::json!({
            "name": name,
            "contentType": content_type,
            "metadata": { "uploadedAt": Utc::now().to_rfc3339() }
        });

        info!("Uploading {} ({} bytes) to gs://{}", name, bytes.len(), self.bucket);
        let url = format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=multipart",
            self.endpoint, self.bucket
        );
        let resp = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(multipart_related_body(&boundary, &metadata, content_type, bytes))
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Self::check(resp, "Upload").await?;
        Ok(())
    }

    async fn signed_read_url(&self, name: &str, ttl: Duration) -> Result<String, StorageError> {
        let request = SignedUrlRequest {
            scheme: self.scheme.clone(),
            host: self.host.clone(),
            bucket: self.bucket.clone(),
            object: name.to_string(),
            client_email: self.auth.client_email().await?,
            ttl_secs: ttl.as_secs(),
            timestamp: Utc::now(),
        };
        let signature = self.auth.sign_bytes(request.string_to_sign().as_bytes()).await?;
        debug!("Signed read URL for {} valid {}s", name, ttl.as_secs());
        Ok(request.into_url(&signature))
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        let token = self.auth.access_token().await?;
        let resp = self
            .client
            .delete(self.object_url(name))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Self::check(resp, "Delete").await?;
        Ok(())
    }

    async fn probe(&self) -> Result<(), StorageError> {
        let token = self.auth.access_token().await?;
        let url = format!("{}/storage/v1/b/{}", self.endpoint, self.bucket);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Self::check(resp, "Bucket lookup").await?;
        Ok(())
    }
}
