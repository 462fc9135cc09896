//! Storage service implementation using Apache OpenDAL.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use opendal::layers::{RetryLayer, TimeoutLayer};
use opendal::{Operator, services};

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;
use super::key::content_digest;

/// Outcome of a successful put.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOutcome {
    /// Entity tag reported by the backend, or the quoted content digest.
    pub etag: String,
    /// Stored size in bytes.
    pub size: u64,
}

/// Object storage operations needed by the upload pipeline.
///
/// Implementations must tolerate concurrent calls from many in-flight requests.
pub trait ObjectStore: Send + Sync {
    /// Stores `data` under `key`.
    fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> impl Future<Output = Result<PutOutcome, StorageError>> + Send;

    /// Checks that the backend is reachable and the bucket accessible.
    fn probe(&self) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Public URL under which `key` is served.
    fn public_url(&self, key: &str) -> String;
}

/// Storage service backed by a single pooled OpenDAL operator.
///
/// Construct once at startup and share behind an `Arc`; the operator's HTTP
/// client keeps its connection pool for the life of the process.
#[derive(Debug)]
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(config: &StorageConfig) -> Result<Operator, StorageError> {
        let operator = match &config.provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region)
                    // TOS only serves virtual-hosted style requests
                    .enable_virtual_host_style();

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::Memory => Operator::new(services::Memory::default())
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish(),
        };

        Ok(operator
            .layer(
                TimeoutLayer::new()
                    .with_timeout(Duration::from_secs(config.timeout_secs))
                    .with_io_timeout(Duration::from_secs(config.timeout_secs)),
            )
            .layer(RetryLayer::new().with_max_times(config.max_retries)))
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        self.config.provider.bucket()
    }

    /// Reads an object back. Used by round-trip checks.
    ///
    /// # Errors
    ///
    /// Returns an error if the object cannot be read.
    pub async fn read(&self, key: &str) -> Result<Bytes, StorageError> {
        let buffer = self.operator.read(key).await?;
        Ok(buffer.to_bytes())
    }
}

impl ObjectStore for StorageService {
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<PutOutcome, StorageError> {
        let size = data.len() as u64;
        let digest = content_digest(&data);

        let mut write = self.operator.write_with(key, data);
        if self
            .operator
            .info()
            .full_capability()
            .write_with_content_type
        {
            write = write.content_type(content_type);
        }
        let metadata = write.await?;

        let etag = metadata
            .etag()
            .map_or_else(|| format!("\"{digest}\""), ToString::to_string);

        Ok(PutOutcome { etag, size })
    }

    async fn probe(&self) -> Result<(), StorageError> {
        self.operator.check().await.map_err(StorageError::from)
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://{}/{}", self.config.public_domain, key)
    }
}
