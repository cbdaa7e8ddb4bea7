// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.
//
// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

use super::credentials::CredentialSource;
use super::error::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

/// Operation timeout applied when none is configured (10 minutes).
pub const DEFAULT_TIMEOUT_MS: u64 = 600_000;

/// Storage provider type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Local filesystem storage, the bucket is a directory
    Local,
    /// In-process storage, contents are lost on drop
    Memory,
    /// AWS S3 storage
    Aws,
    /// Azure Blob Storage
    Azure,
    /// Google Cloud Storage
    Gcs,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Local => "local",
            StorageType::Memory => "memory",
            StorageType::Aws => "aws",
            StorageType::Azure => "azure",
            StorageType::Gcs => "gcs",
        }
    }

    /// Whether the backend lives behind a network and needs credentials.
    pub fn is_remote(&self) -> bool {
        matches!(self, StorageType::Aws | StorageType::Azure | StorageType::Gcs)
    }
}

impl FromStr for StorageType {
    type Err = StorageError;

    fn from_str(s: &str) -> StorageResult<Self> {
        match s.to_lowercase().as_str() {
            "local" | "file" => Ok(StorageType::Local),
            "memory" | "mem" => Ok(StorageType::Memory),
            "aws" | "s3" => Ok(StorageType::Aws),
            "azure" => Ok(StorageType::Azure),
            "gcs" | "gcp" => Ok(StorageType::Gcs),
            _ => Err(StorageError::ConfigError(format!(
                "Unknown storage type: {}",
                s
            ))),
        }
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Configuration for a single-bucket blob store client.
///
/// Provider-specific settings live in `options` and are passed to the
/// object_store builders, as with connection pool and retry settings.
///
/// # Examples
///
/// ## Google Cloud Storage
/// ```
/// use blobstore_client::storage::{CredentialSource, StorageConfig};
/// use std::time::Duration;
///
/// let config = StorageConfig::gcs("my-bucket")
///     .with_timeout(Duration::from_secs(600))
///     .with_credentials(CredentialSource::file("/path/to/key.json"));
/// ```
///
/// ## AWS S3
/// ```
/// use blobstore_client::storage::StorageConfig;
///
/// let config = StorageConfig::aws("my-bucket")
///     .with_option("region", "us-east-1")
///     .with_option("access_key_id", "ACCESS_KEY")
///     .with_option("secret_access_key", "SECRET_ACCESS_KEY");
/// ```
///
/// ## Local filesystem
/// ```
/// use blobstore_client::storage::StorageConfig;
///
/// let config = StorageConfig::local("/tmp/bucket");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage provider type
    #[serde(rename = "type")]
    pub storage_type: StorageType,

    /// Bucket (or container) name. For local storage this is the root directory.
    #[serde(default)]
    pub bucket: String,

    /// Deadline applied independently to every upload, download and exists call.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Where backend credentials come from, `None` for the backend's default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<CredentialSource>,

    /// Provider-specific configuration options
    ///
    /// AWS S3: region, access_key_id, secret_access_key, session_token, endpoint, allow_http
    ///
    /// Azure: account_name, access_key, sas_token, tenant_id, client_id, client_secret, endpoint
    ///
    /// GCS: service_account_key
    ///
    /// All: request_timeout, connect_timeout, max_retries, retry_timeout,
    /// pool_idle_timeout, pool_max_idle_per_host, validate_on_open
    #[serde(default)]
    pub options: HashMap<String, String>,
}

impl StorageConfig {
    /// Create a new storage configuration.
    ///
    /// # Arguments
    ///
    /// * `storage_type` - The storage backend
    /// * `bucket` - The bucket, container or root directory
    pub fn new(storage_type: StorageType, bucket: impl Into<String>) -> Self {
        Self {
            storage_type,
            bucket: bucket.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            credentials: None,
            options: Self::default_options(),
        }
    }

    /// Google Cloud Storage, credentials from `GOOGLE_APPLICATION_CREDENTIALS`.
    pub fn gcs(bucket: impl Into<String>) -> Self {
        Self::new(StorageType::Gcs, bucket)
    }

    /// AWS S3, credentials from the options map.
    pub fn aws(bucket: impl Into<String>) -> Self {
        Self::new(StorageType::Aws, bucket)
    }

    /// Azure Blob Storage, credentials from the options map.
    pub fn azure(container: impl Into<String>) -> Self {
        Self::new(StorageType::Azure, container)
    }

    /// A directory on the local filesystem acting as the bucket.
    pub fn local(root: impl Into<String>) -> Self {
        Self::new(StorageType::Local, root)
    }

    pub fn memory() -> Self {
        Self::new(StorageType::Memory, "memory")
    }

    /// Parse a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ConfigError`] if the JSON is malformed.
    pub fn from_json(json: &str) -> StorageResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| StorageError::ConfigError(format!("Invalid storage config: {}", e)))
    }

    /// Get default options for all storage types.
    ///
    /// Retries default to zero: the caller owns retry policy.
    pub fn default_options() -> HashMap<String, String> {
        [
            ("connect_timeout", "30"),
            ("max_retries", "0"),
            ("pool_idle_timeout", "15"),
            ("pool_max_idle_per_host", "5"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_credentials(mut self, credentials: CredentialSource) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// The configured credential source, or the backend's default.
    pub fn credential_source(&self) -> CredentialSource {
        self.credentials
            .clone()
            .unwrap_or_else(|| CredentialSource::default_for(&self.storage_type))
    }

    /// Add a configuration option.
    ///
    /// # Returns
    ///
    /// The `StorageConfig` instance with the added option (for method chaining).
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Add multiple configuration options.
    pub fn with_options(mut self, options: HashMap<String, String>) -> Self {
        self.options.extend(options);
        self
    }

    pub fn get_option(&self, key: &str) -> Option<&String> {
        self.options.get(key)
    }

    /// Boolean option, `true` only for a case-insensitive "true".
    pub fn flag(&self, key: &str) -> bool {
        self.options
            .get(key)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn storage_type_str(&self) -> &str {
        self.storage_type.as_str()
    }

    /// Check the fields every backend depends on.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ConfigError`] if the timeout is zero or a
    /// non-memory backend has an empty bucket.
    pub fn validate(&self) -> StorageResult<()> {
        if self.timeout_ms == 0 {
            return Err(StorageError::ConfigError(
                "Operation timeout must be positive".to_string(),
            ));
        }
        if self.storage_type != StorageType::Memory && self.bucket.trim().is_empty() {
            return Err(StorageError::ConfigError(format!(
                "{} storage requires a bucket",
                self.storage_type_str()
            )));
        }
        Ok(())
    }
}
