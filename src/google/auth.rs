//! OAuth access tokens and blob signing for Google Cloud APIs.
//!
//! Credentials are resolved in this order:
//! 1. A pre-issued access token (`GOOGLE_OAUTH_ACCESS_TOKEN`)
//! 2. A service account key file (`GOOGLE_APPLICATION_CREDENTIALS`)
//! 3. The GCE/Cloud Run metadata server
//!
//! Service account keys sign locally with RS256. Every other source signs
//! through the IAM Credentials `signBlob` API.

use std::path::Path;
use std::time::Duration;

use base64::Engine;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{api_error_message, CLOUD_PLATFORM_SCOPE};
use crate::config::GoogleConfig;

const METADATA_BASE: &str = "http://metadata.google.internal";
const IAM_CREDENTIALS_BASE: &str = "https://iamcredentials.googleapis.com";

/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Lifetime requested for service account JWT assertions.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Errors from credential resolution, token exchange or signing.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials: {0}")]
    Credentials(String),

    #[error("Token request failed: {0}")]
    Token(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fields of a service account key file that are needed here.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        serde_json::from_str(json)
            .map_err(|e| AuthError::Credentials(format!("malformed key file: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self, AuthError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

enum CredentialSource {
    StaticToken(String),
    ServiceAccount {
        key: ServiceAccountKey,
        signer: EncodingKey,
    },
    MetadataServer,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Serialize)]
struct SignBlobRequest {
    payload: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignBlobResponse {
    signed_blob: String,
}

/// Google credential handle, shared by every cloud client.
pub struct GoogleAuth {
    source: CredentialSource,
    service_account_email: Option<String>,
    client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
    metadata_base: String,
    iam_base: String,
}

impl GoogleAuth {
    /// Resolve credentials from configuration.
    pub fn from_config(config: &GoogleConfig) -> Result<Self, AuthError> {
        let mut auth = if let Some(token) = &config.access_token {
            info!("Using pre-issued Google access token");
            Self::with_source(CredentialSource::StaticToken(token.clone()))
        } else if let Some(path) = &config.credentials {
            info!("Using service account key: {}", path.display());
            Self::from_service_account(ServiceAccountKey::from_file(path)?)?
        } else {
            info!("Using metadata server credentials");
            Self::with_source(CredentialSource::MetadataServer)
        };
        if config.service_account_email.is_some() {
            auth.service_account_email = config.service_account_email.clone();
        }
        Ok(auth)
    }

    /// Use a fixed bearer token.
    pub fn with_static_token(token: impl Into<String>) -> Self {
        Self::with_source(CredentialSource::StaticToken(token.into()))
    }

    /// Use a service account key for token exchange and local signing.
    pub fn from_service_account(key: ServiceAccountKey) -> Result<Self, AuthError> {
        let signer = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| AuthError::Credentials(format!("invalid private key: {}", e)))?;
        let email = key.client_email.clone();
        let mut auth = Self::with_source(CredentialSource::ServiceAccount { key, signer });
        auth.service_account_email = Some(email);
        Ok(auth)
    }

    /// Use the metadata server.
    pub fn metadata_server() -> Self {
        Self::with_source(CredentialSource::MetadataServer)
    }

    fn with_source(source: CredentialSource) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            source,
            service_account_email: None,
            client,
            cached: Mutex::new(None),
            metadata_base: METADATA_BASE.to_string(),
            iam_base: IAM_CREDENTIALS_BASE.to_string(),
        }
    }

    /// Override the metadata server base URL.
    pub fn with_metadata_base(mut self, base: impl Into<String>) -> Self {
        self.metadata_base = base.into();
        self
    }

    /// Override the IAM Credentials API base URL.
    pub fn with_iam_base(mut self, base: impl Into<String>) -> Self {
        self.iam_base = base.into();
        self
    }

    /// Set the service account used for remote signing.
    pub fn with_service_account_email(mut self, email: impl Into<String>) -> Self {
        self.service_account_email = Some(email.into());
        self
    }

    /// Short label for the credential source, for logs and health output.
    pub fn source_name(&self) -> &'static str {
        match self.source {
            CredentialSource::StaticToken(_) => "access-token",
            CredentialSource::ServiceAccount { .. } => "service-account",
            CredentialSource::MetadataServer => "metadata-server",
        }
    }

    /// Get a bearer token, refreshing the cached one when it is close to expiry.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        if let CredentialSource::StaticToken(token) = &self.source {
            return Ok(token.clone());
        }

        let mut cached = self.cached.lock().await;
        if let Some(existing) = cached.as_ref() {
            if existing.expires_at - chrono::Duration::seconds(EXPIRY_MARGIN_SECS) > Utc::now() {
                return Ok(existing.token.clone());
            }
        }

        let response = match &self.source {
            CredentialSource::ServiceAccount { key, signer } => {
                self.exchange_assertion(key, signer).await?
            }
            CredentialSource::MetadataServer => self.metadata_token().await?,
            CredentialSource::StaticToken(_) => unreachable!("handled above"),
        };

        let expires_at = Utc::now() + chrono::Duration::seconds(response.expires_in.unwrap_or(3600));
        debug!("Obtained access token valid until {}", expires_at);
        *cached = Some(CachedToken {
            token: response.access_token.clone(),
            expires_at,
        });
        Ok(response.access_token)
    }

    /// Email of the service account the credentials belong to.
    pub async fn client_email(&self) -> Result<String, AuthError> {
        if let Some(email) = &self.service_account_email {
            return Ok(email.clone());
        }
        match &self.source {
            CredentialSource::MetadataServer => self.metadata_email().await,
            _ => Err(AuthError::Signing(
                "no service account email configured (set GOOGLE_SERVICE_ACCOUNT_EMAIL)".to_string(),
            )),
        }
    }

    /// RSA-SHA256 signature of `bytes` under the service account's key.
    pub async fn sign_bytes(&self, bytes: &[u8]) -> Result<Vec<u8>, AuthError> {
        match &self.source {
            CredentialSource::ServiceAccount { signer, .. } => {
                let encoded = jsonwebtoken::crypto::sign(bytes, signer, Algorithm::RS256)
                    .map_err(|e| AuthError::Signing(e.to_string()))?;
                base64::engine::general_purpose::URL_SAFE_NO_PAD
                    .decode(encoded)
                    .map_err(|e| AuthError::Signing(e.to_string()))
            }
            _ => self.sign_blob_remote(bytes).await,
        }
    }

    async fn exchange_assertion(
        &self,
        key: &ServiceAccountKey,
        signer: &EncodingKey,
    ) -> Result<TokenResponse, AuthError> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &key.client_email,
            scope: CLOUD_PLATFORM_SCOPE,
            aud: &key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, signer)
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        let resp = self
            .client
            .post(&key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Token(e.to_string()))?;

        Self::read_token(resp).await
    }

    async fn metadata_token(&self) -> Result<TokenResponse, AuthError> {
        let url = format!(
            "{}/computeMetadata/v1/instance/service-accounts/default/token",
            self.metadata_base
        );
        let resp = self
            .client
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| AuthError::Token(format!("metadata server unreachable: {}", e)))?;

        Self::read_token(resp).await
    }

    async fn read_token(resp: reqwest::Response) -> Result<TokenResponse, AuthError> {
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::Token(format!(
                "HTTP {}: {}",
                status,
                api_error_message(&body)
            )));
        }
        resp.json()
            .await
            .map_err(|e| AuthError::Token(format!("malformed token response: {}", e)))
    }

    async fn metadata_email(&self) -> Result<String, AuthError> {
        let url = format!(
            "{}/computeMetadata/v1/instance/service-accounts/default/email",
            self.metadata_base
        );
        let resp = self
            .client
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| AuthError::Credentials(format!("metadata server unreachable: {}", e)))?;

        if !resp.status().is_success() {
            return Err(AuthError::Credentials(format!(
                "metadata email lookup failed: HTTP {}",
                resp.status()
            )));
        }
        let email = resp
            .text()
            .await
            .map_err(|e| AuthError::Credentials(e.to_string()))?;
        Ok(email.trim().to_string())
    }

    async fn sign_blob_remote(&self, bytes: &[u8]) -> Result<Vec<u8>, AuthError> {
        let email = self.client_email().await?;
        let token = self.access_token().await?;
        let url = format!(
            "{}/v1/projects/-/serviceAccounts/{}:signBlob",
            self.iam_base,
            urlencoding::encode(&email)
        );
        let request = SignBlobRequest {
            payload: base64::engine::general_purpose::STANDARD.encode(bytes),
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::Signing(format!(
                "signBlob HTTP {}: {}",
                status,
                api_error_message(&body)
            )));
        }

        let signed: SignBlobResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::Signing(format!("malformed signBlob response: {}", e)))?;
        base64::engine::general_purpose::STANDARD
            .decode(signed.signed_blob)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }
}
