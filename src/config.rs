//! Configuration management for the analyst service using the prefer crate.
//!
//! Config files are discovered by prefer (`startup-analyst.{toml,yaml,json}`)
//! and parsed with serde according to their extension. Environment variables
//! are applied last and win over file values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::llm::ModelConfig;

/// Default Google Cloud project.
pub const DEFAULT_PROJECT_ID: &str = "ai-startup-analyst";
/// Default Google Cloud region.
pub const DEFAULT_LOCATION: &str = "us-central1";
/// Default bucket for uploaded documents.
pub const DEFAULT_BUCKET: &str = "ai-startup-analyst-docs";
/// Largest accepted upload (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Google Cloud project and credential settings shared by every client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// Project that owns the Vertex AI and storage resources.
    #[serde(default = "default_project_id")]
    pub project_id: String,
    /// Vertex AI region.
    #[serde(default = "default_location")]
    pub location: String,
    /// Path to a service account key file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<PathBuf>,
    /// Pre-issued OAuth access token (skips credential discovery).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Service account used for remote URL signing when no key file is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_email: Option<String>,
}

fn default_project_id() -> String {
    DEFAULT_PROJECT_ID.to_string()
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            project_id: default_project_id(),
            location: default_location(),
            credentials: None,
            access_token: None,
            service_account_email: None,
        }
    }
}

impl GoogleConfig {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `GOOGLE_CLOUD_PROJECT_ID`
    /// - `GOOGLE_CLOUD_LOCATION`
    /// - `GOOGLE_APPLICATION_CREDENTIALS`: service account key file
    /// - `GOOGLE_OAUTH_ACCESS_TOKEN`: static bearer token
    /// - `GOOGLE_SERVICE_ACCOUNT_EMAIL`
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(val) = env_nonempty("GOOGLE_CLOUD_PROJECT_ID") {
            self.project_id = val;
        }
        if let Some(val) = env_nonempty("GOOGLE_CLOUD_LOCATION") {
            self.location = val;
        }
        if let Some(val) = env_nonempty("GOOGLE_APPLICATION_CREDENTIALS") {
            self.credentials = Some(PathBuf::from(val));
        }
        if let Some(val) = env_nonempty("GOOGLE_OAUTH_ACCESS_TOKEN") {
            self.access_token = Some(val);
        }
        if let Some(val) = env_nonempty("GOOGLE_SERVICE_ACCOUNT_EMAIL") {
            self.service_account_email = Some(val);
        }
        self
    }
}

/// Cloud Vision settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionConfig {
    /// API base URL.
    #[serde(default = "default_vision_endpoint")]
    pub endpoint: String,
}

fn default_vision_endpoint() -> String {
    "https://vision.googleapis.com".to_string()
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_vision_endpoint(),
        }
    }
}

/// Where uploaded documents end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// No upload; a deterministic `demo/` locator is returned.
    #[default]
    Placeholder,
    /// Google Cloud Storage with signed read URLs.
    Gcs,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Placeholder => "placeholder",
            Self::Gcs => "gcs",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "placeholder" | "demo" => Some(Self::Placeholder),
            "gcs" | "google" => Some(Self::Gcs),
            _ => None,
        }
    }
}

/// Blob storage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// API base URL.
    #[serde(default = "default_storage_endpoint")]
    pub endpoint: String,
    /// Prefix for object keys generated by the upload endpoint.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Lifetime of signed read URLs.
    #[serde(default = "default_signed_url_ttl_secs")]
    pub signed_url_ttl_secs: u64,
}

fn default_bucket() -> String {
    DEFAULT_BUCKET.to_string()
}

fn default_storage_endpoint() -> String {
    "https://storage.googleapis.com".to_string()
}

fn default_key_prefix() -> String {
    "startup-docs".to_string()
}

fn default_signed_url_ttl_secs() -> u64 {
    24 * 60 * 60
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: default_bucket(),
            endpoint: default_storage_endpoint(),
            key_prefix: default_key_prefix(),
            signed_url_ttl_secs: default_signed_url_ttl_secs(),
        }
    }
}

impl StorageConfig {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `UPLOAD_STORAGE`: "placeholder" or "gcs"
    /// - `GOOGLE_CLOUD_BUCKET`
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(val) = env_nonempty("UPLOAD_STORAGE") {
            match StorageBackend::from_str(&val) {
                Some(backend) => self.backend = backend,
                None => tracing::warn!("Ignoring unknown UPLOAD_STORAGE value: {}", val),
            }
        }
        if let Some(val) = env_nonempty("GOOGLE_CLOUD_BUCKET") {
            self.bucket = val;
        }
        self
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (`host:port`, `host`, or `port`).
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub vision: VisionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
    /// File this config was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Falls back to defaults when no config file is found.
    pub async fn load() -> Self {
        match prefer::load("startup-analyst").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("{}; using defaults", e);
                            Self::default_with_env()
                        }
                    }
                } else {
                    Self::default_with_env()
                }
            }
            Err(_) => Self::default_with_env(),
        }
    }

    /// Load from an explicit path if given, otherwise discover.
    pub async fn load_with_override(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path)
                .await
                .map_err(|e| anyhow::anyhow!(e)),
            None => Ok(Self::load().await),
        }
    }

    /// Defaults with environment variable overrides applied.
    pub fn default_with_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config.with_env_overrides())
    }

    /// Parse config text in the format named by `ext`, without env overrides.
    pub fn parse(contents: &str, ext: &str) -> Result<Self, String> {
        match ext {
            "toml" => toml::from_str(contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e)),
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e)),
            _ => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e)),
        }
    }

    pub fn with_env_overrides(mut self) -> Self {
        self.google = self.google.with_env_overrides();
        self.model = self.model.with_env_overrides();
        self.storage = self.storage.with_env_overrides();
        self
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}
