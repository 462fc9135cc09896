//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Service identity reported by the root and health endpoints.
    pub app: AppInfo,
    /// Server configuration.
    pub server: ServerConfig,
    /// API key configuration.
    pub auth: AuthConfig,
    /// Upload limits.
    pub upload: UploadConfig,
    /// Object storage configuration.
    pub storage: StorageSettings,
    /// Health probe caching.
    pub health: HealthConfig,
    /// Logging configuration.
    pub log: LogConfig,
}

/// Service identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppInfo {
    /// Human readable service name.
    pub name: String,
    /// Service version.
    pub version: String,
}

impl Default for AppInfo {
    fn default() -> Self {
        Self {
            name: "TOS Upload Service".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Upper bound on the time a single request may take.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10086,
            request_timeout_secs: 30,
        }
    }
}

/// API key configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Expected value of the `X-API-Key` header.
    pub api_key: String,
}

/// Upload limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Maximum decoded image size in megabytes.
    pub max_file_size_mb: u64,
    /// Maximum number of images in a batch request.
    pub max_batch_size: usize,
    /// Prefix used when the caller does not supply one.
    pub default_prefix: String,
}

impl UploadConfig {
    /// Maximum decoded image size in bytes.
    #[must_use]
    pub const fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 10,
            max_batch_size: 10,
            default_prefix: "generated/".to_string(),
        }
    }
}

/// Raw object storage settings, turned into a provider by the core crate.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Provider kind: `s3`, `fs` or `memory`.
    pub provider: String,
    /// S3-compatible endpoint URL.
    pub endpoint: String,
    /// Bucket region.
    pub region: String,
    /// Bucket name.
    pub bucket: String,
    /// Access key ID.
    pub access_key: String,
    /// Secret access key.
    pub secret_key: String,
    /// Domain serving public object URLs. Derived from bucket and endpoint when absent.
    pub public_domain: Option<String>,
    /// Root directory for the `fs` provider.
    pub root: Option<String>,
    /// Per-operation timeout applied by the storage client.
    pub timeout_secs: u64,
    /// Retries performed by the storage client on transient failures.
    pub max_retries: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: "s3".to_string(),
            endpoint: "https://tos-s3-ap-southeast-1.volces.com".to_string(),
            region: "ap-southeast-1".to_string(),
            bucket: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            public_domain: None,
            root: None,
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

/// Health probe caching.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// How long a storage probe result stays fresh.
    pub cache_ttl_secs: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self { cache_ttl_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
    /// Also write daily rotated files under `dir`.
    pub file_enabled: bool,
    /// Directory for `tos_upload.YYYY-MM-DD.log` files.
    pub dir: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file_enabled: true,
            dir: "logs".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, lowest precedence first: `config/default`, `config/{RUN_MODE}`,
    /// then `TOS_UPLOAD__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TOS_UPLOAD").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
