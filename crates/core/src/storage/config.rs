//! Storage configuration types.

use std::path::PathBuf;

use tos_upload_shared::StorageSettings;

use super::error::StorageError;

/// Storage provider configuration.
#[derive(Debug, Clone)]
pub enum StorageProvider {
    /// S3-compatible storage: Volcano Engine TOS, AWS S3, Cloudflare R2
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// Bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Bucket region.
        region: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// In-process memory (tests only)
    Memory,
}

impl StorageProvider {
    /// Create S3-compatible provider.
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Get the provider name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "fs",
            Self::Memory => "memory",
        }
    }

    /// Get the bucket name, or the root for local providers.
    #[must_use]
    pub fn bucket(&self) -> &str {
        match self {
            Self::S3 { bucket, .. } => bucket,
            Self::LocalFs { root } => root.to_str().unwrap_or("local"),
            Self::Memory => "memory",
        }
    }
}

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Domain that serves uploaded objects publicly.
    pub public_domain: String,
    /// Per-operation timeout in seconds.
    pub timeout_secs: u64,
    /// Retries on transient backend failures.
    pub max_retries: usize,
}

impl StorageConfig {
    /// Default operation timeout: 30 seconds.
    pub const DEFAULT_TIMEOUT: u64 = 30;
    /// Default retry budget.
    pub const DEFAULT_MAX_RETRIES: usize = 3;

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider, public_domain: impl Into<String>) -> Self {
        Self {
            provider,
            public_domain: public_domain.into(),
            timeout_secs: Self::DEFAULT_TIMEOUT,
            max_retries: Self::DEFAULT_MAX_RETRIES,
        }
    }

    /// Set operation timeout.
    #[must_use]
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set retry budget.
    #[must_use]
    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries;
        self
    }

    /// Builds the storage config from raw application settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unknown provider, an `s3`
    /// provider without a bucket, or an `fs` provider without a root.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        let provider = match settings.provider.to_ascii_lowercase().as_str() {
            "s3" | "tos" => {
                if settings.bucket.trim().is_empty() {
                    return Err(StorageError::configuration("storage.bucket is required"));
                }
                StorageProvider::s3(
                    &settings.endpoint,
                    &settings.bucket,
                    &settings.access_key,
                    &settings.secret_key,
                    &settings.region,
                )
            }
            "fs" | "local" => {
                let root = settings
                    .root
                    .as_deref()
                    .ok_or_else(|| StorageError::configuration("storage.root is required"))?;
                StorageProvider::local_fs(root)
            }
            "memory" => StorageProvider::Memory,
            other => {
                return Err(StorageError::configuration(format!(
                    "unknown storage provider '{other}'"
                )));
            }
        };

        let public_domain = settings.public_domain.clone().unwrap_or_else(|| {
            default_public_domain(&settings.bucket, &settings.endpoint)
        });

        Ok(Self::new(provider, public_domain)
            .with_timeout(settings.timeout_secs)
            .with_max_retries(settings.max_retries))
    }
}

/// Virtual-hosted style domain: `{bucket}.{endpoint host}`.
fn default_public_domain(bucket: &str, endpoint: &str) -> String {
    let host = endpoint
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');

    if bucket.is_empty() {
        host.to_string()
    } else {
        format!("{bucket}.{host}")
    }
}
