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

use super::config::{StorageConfig, StorageType};
use super::credentials::ResolvedCredential;
use super::error::{StorageError, StorageResult};
use super::provider::{string_to_path, BlobStore};
use crate::util::deadline::{require_non_empty, require_non_empty_path, with_deadline};
use crate::util::local::{temp_prefix, PartialDownload};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::{Stream, StreamExt};
use object_store::{
    aws::AmazonS3Builder, azure::MicrosoftAzureBuilder, buffered::BufWriter,
    gcp::GoogleCloudStorageBuilder, local::LocalFileSystem, memory::InMemory, ClientOptions,
    ObjectStore, ObjectStoreExt, RetryConfig,
};
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Read size used when streaming a local file to the backend.
const UPLOAD_CHUNK_SIZE: usize = 1024 * 1024;

/// Whether a backend error means the object does not exist.
pub(crate) fn is_not_found(err: &object_store::Error) -> bool {
    matches!(err, object_store::Error::NotFound { .. })
}

/// Builder for constructing an `ObjectStoreClient` instance.
///
/// # Examples
///
/// ```no_run
/// use blobstore_client::storage::{ObjectStoreClient, StorageConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
/// let client = ObjectStoreClient::builder(StorageConfig::gcs("my-bucket"))
///     .with_download_dir("/var/tmp/downloads")
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct ObjectStoreClientBuilder {
    config: StorageConfig,
    store: Option<Arc<dyn ObjectStore>>,
    download_dir: Option<PathBuf>,
}

impl ObjectStoreClientBuilder {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            store: None,
            download_dir: None,
        }
    }

    /// Directory downloads are written to. Defaults to the system temp dir.
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }

    /// Use an already constructed store instead of building one from the config.
    ///
    /// Credential resolution is skipped; bucket and timeout still come from the config.
    pub fn with_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Builds the `ObjectStoreClient` instance.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * The configuration is invalid or no credential source is discoverable (`ConfigError`)
    /// * The backend builder rejects the configuration (`ConfigError`)
    /// * `validate_on_open` is set and the backend cannot be reached in time (`ConnectionError`)
    pub async fn build(self) -> StorageResult<ObjectStoreClient> {
        self.config.validate()?;

        let store = match self.store {
            Some(store) => store,
            None => {
                let credential = self
                    .config
                    .credential_source()
                    .resolve(&self.config.storage_type)?;
                Arc::from(ObjectStoreClient::build_store(&self.config, &credential)?)
            }
        };

        let client = ObjectStoreClient {
            bucket: self.config.bucket.clone(),
            timeout: self.config.timeout(),
            download_dir: self.download_dir.unwrap_or_else(std::env::temp_dir),
            handle: RwLock::new(Some(store)),
            config: self.config,
        };

        if client.config.flag("validate_on_open") {
            client.validate_connection().await?;
        }

        info!(
            "Opened blob store client type={}, bucket={}, timeout_ms={}",
            client.config.storage_type_str(),
            client.bucket,
            client.timeout.as_millis()
        );
        Ok(client)
    }
}

/// Blob store client backed by any `object_store` backend.
///
/// Google Cloud Storage, AWS S3 and Azure are the production backends; the
/// local filesystem and in-memory backends serve development and tests.
pub struct ObjectStoreClient {
    config: StorageConfig,
    bucket: String,
    timeout: Duration,
    download_dir: PathBuf,
    handle: RwLock<Option<Arc<dyn ObjectStore>>>,
}

impl ObjectStoreClient {
    pub fn builder(config: StorageConfig) -> ObjectStoreClientBuilder {
        ObjectStoreClientBuilder::new(config)
    }

    /// Open a client with default settings.
    ///
    /// Construction does not verify that the bucket exists.
    pub async fn open(config: StorageConfig) -> StorageResult<Self> {
        Self::builder(config).build().await
    }

    /// Wrap an existing store, e.g. a throttled or instrumented one.
    pub async fn from_store(
        config: StorageConfig,
        store: Arc<dyn ObjectStore>,
    ) -> StorageResult<Self> {
        Self::builder(config).with_store(store).build().await
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Probe the backend with a root listing.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ConnectionError`] if the listing fails or does not
    /// finish within the configured timeout.
    pub async fn validate_connection(&self) -> StorageResult<()> {
        let store = self.handle().await?;
        match tokio::time::timeout(self.timeout, store.list_with_delimiter(None)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(StorageError::ConnectionError(format!(
                "Failed to reach {} bucket '{}': {}",
                self.config.storage_type_str(),
                self.bucket,
                e
            ))),
            Err(_) => Err(StorageError::ConnectionError(format!(
                "No response from {} bucket '{}' within {:?}",
                self.config.storage_type_str(),
                self.bucket,
                self.timeout
            ))),
        }
    }

    /// Clone the shared handle out of the lock so no lock is held across I/O.
    async fn handle(&self) -> StorageResult<Arc<dyn ObjectStore>> {
        self.handle
            .read()
            .await
            .as_ref()
            .map(Arc::clone)
            .ok_or(StorageError::Closed)
    }

    /// Build the appropriate object store based on configuration.
    fn build_store(
        config: &StorageConfig,
        credential: &ResolvedCredential,
    ) -> StorageResult<Box<dyn ObjectStore>> {
        match config.storage_type {
            StorageType::Local => Self::build_local_store(config),
            StorageType::Memory => Ok(Box::new(InMemory::new())),
            StorageType::Aws => Self::build_aws_store(config, credential),
            StorageType::Azure => Self::build_azure_store(config, credential),
            StorageType::Gcs => Self::build_gcs_store(config, credential),
        }
    }

    /// Build a local filesystem store rooted at the bucket directory.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * The path cannot be canonicalized (doesn't exist or permission denied)
    /// * The path is not a directory
    fn build_local_store(config: &StorageConfig) -> StorageResult<Box<dyn ObjectStore>> {
        let root = PathBuf::from(&config.bucket);

        let canonical_path = root.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to resolve path '{}': {} (path must exist)",
                config.bucket, e
            ))
        })?;

        if !canonical_path.is_dir() {
            return Err(StorageError::ConfigError(format!(
                "Base path is not a directory: {}",
                canonical_path.display()
            )));
        }

        let store = LocalFileSystem::new_with_prefix(&canonical_path).map_err(|e| {
            StorageError::ConfigError(format!("Failed to create local store: {}", e))
        })?;

        Ok(Box::new(store))
    }

    /// Build connection options from configuration.
    fn build_connection_options(config: &StorageConfig) -> ClientOptions {
        let mut client_options = ClientOptions::default();
        if let Some(timeout_str) = config.options.get("request_timeout") {
            if timeout_str == "0" || timeout_str == "disabled" {
                client_options = client_options.with_timeout_disabled();
            } else if let Ok(sec) = timeout_str.parse::<u64>() {
                client_options = client_options.with_timeout(Duration::from_secs(sec))
            }
        };
        if let Some(connect_timeout_str) = config.options.get("connect_timeout") {
            if connect_timeout_str == "0" || connect_timeout_str == "disabled" {
                client_options = client_options.with_connect_timeout_disabled();
            } else if let Ok(sec) = connect_timeout_str.parse::<u64>() {
                client_options = client_options.with_connect_timeout(Duration::from_secs(sec))
            }
        }
        if let Some(pool_idle_timeout_str) = config.options.get("pool_idle_timeout") {
            if let Ok(sec) = pool_idle_timeout_str.parse::<u64>() {
                client_options = client_options.with_pool_idle_timeout(Duration::from_secs(sec))
            }
        }
        if let Some(pool_max_idle_per_host_str) = config.options.get("pool_max_idle_per_host") {
            if let Ok(max_idle) = pool_max_idle_per_host_str.parse::<usize>() {
                client_options = client_options.with_pool_max_idle_per_host(max_idle)
            }
        }
        if config.flag("allow_http") {
            client_options = client_options.with_allow_http(true);
        }
        client_options
    }

    /// Build the backend HTTP retry policy.
    ///
    /// Retries are off unless `max_retries` says otherwise, and never exceed the
    /// operation timeout.
    fn build_retry_options(config: &StorageConfig) -> RetryConfig {
        let default_retry_config = RetryConfig::default();
        let max_retries = config
            .options
            .get("max_retries")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(0);
        let retry_timeout = config
            .options
            .get("retry_timeout")
            .and_then(|s| Some(Duration::from_secs(s.parse::<u64>().ok()?)))
            .unwrap_or(default_retry_config.retry_timeout)
            .min(config.timeout());
        RetryConfig {
            backoff: Default::default(),
            max_retries,
            retry_timeout,
        }
    }

    fn is_shared_option(key: &str) -> bool {
        matches!(
            key,
            "request_timeout"
                | "connect_timeout"
                | "max_retries"
                | "retry_timeout"
                | "pool_idle_timeout"
                | "pool_max_idle_per_host"
                | "allow_http"
                | "validate_on_open"
        )
    }

    /// Build an AWS S3 store.
    fn build_aws_store(
        config: &StorageConfig,
        credential: &ResolvedCredential,
    ) -> StorageResult<Box<dyn ObjectStore>> {
        let builder = match credential {
            ResolvedCredential::Environment { .. } => AmazonS3Builder::from_env(),
            _ => AmazonS3Builder::new(),
        };
        let mut builder = builder
            .with_bucket_name(&config.bucket)
            .with_client_options(Self::build_connection_options(config))
            .with_retry(Self::build_retry_options(config));

        for (key, value) in &config.options {
            match key.as_str() {
                "region" => builder = builder.with_region(value),
                "access_key_id" => builder = builder.with_access_key_id(value),
                "secret_access_key" => builder = builder.with_secret_access_key(value),
                "session_token" | "token" => builder = builder.with_token(value),
                "endpoint" => builder = builder.with_endpoint(value),
                key if Self::is_shared_option(key) => (),
                _ => warn!("Unknown AWS S3 option: {}", key),
            }
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to create S3 store: {}", e)))?;
        Ok(Box::new(store))
    }

    /// Build an Azure Blob store, the bucket is the container.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * `account_name` is missing and credentials do not come from the environment
    /// * The Azure store cannot be initialized
    fn build_azure_store(
        config: &StorageConfig,
        credential: &ResolvedCredential,
    ) -> StorageResult<Box<dyn ObjectStore>> {
        let builder = match credential {
            ResolvedCredential::Environment { .. } => MicrosoftAzureBuilder::from_env(),
            _ => {
                let account_name = config.get_option("account_name").ok_or_else(|| {
                    StorageError::ConfigError("Azure requires 'account_name' option".to_string())
                })?;
                MicrosoftAzureBuilder::new().with_account(account_name)
            }
        };
        let mut builder = builder
            .with_container_name(&config.bucket)
            .with_client_options(Self::build_connection_options(config))
            .with_retry(Self::build_retry_options(config));

        for (key, value) in &config.options {
            match key.as_str() {
                "account_name" => builder = builder.with_account(value),
                "access_key" | "account_key" => builder = builder.with_access_key(value),
                "sas_token" => {
                    let pairs: Vec<(String, String)> = value
                        .trim_start_matches('?')
                        .split('&')
                        .filter_map(|pair| {
                            let mut parts = pair.split('=');
                            match (parts.next(), parts.next()) {
                                (Some(k), Some(v)) => Some((k.to_string(), v.to_string())),
                                _ => None,
                            }
                        })
                        .collect();
                    builder = builder.with_sas_authorization(pairs);
                }
                "tenant_id" => builder = builder.with_tenant_id(value),
                "client_id" => builder = builder.with_client_id(value),
                "client_secret" => builder = builder.with_client_secret(value),
                "endpoint" => builder = builder.with_endpoint(value.clone()),
                key if Self::is_shared_option(key) => (),
                _ => warn!("Unknown Azure option: {}", key),
            }
        }

        let store = builder.build().map_err(|e| {
            StorageError::ConfigError(format!("Failed to create Azure store: {}", e))
        })?;
        Ok(Box::new(store))
    }

    /// Build a GCS store.
    ///
    /// An environment credential is the path to an Application Default
    /// Credentials file, as with `GOOGLE_APPLICATION_CREDENTIALS`. Both
    /// service-account keys and `authorized_user` files are accepted.
    fn build_gcs_store(
        config: &StorageConfig,
        credential: &ResolvedCredential,
    ) -> StorageResult<Box<dyn ObjectStore>> {
        let mut builder = GoogleCloudStorageBuilder::new()
            .with_bucket_name(&config.bucket)
            .with_client_options(Self::build_connection_options(config))
            .with_retry(Self::build_retry_options(config));

        match credential {
            ResolvedCredential::Environment { value, .. } => {
                builder = builder.with_application_credentials(value)
            }
            ResolvedCredential::ServiceAccountPath(path) => {
                builder = builder.with_service_account_path(path.to_string_lossy())
            }
            ResolvedCredential::Options | ResolvedCredential::None => (),
        }

        for (key, value) in &config.options {
            match key.as_str() {
                "service_account_key_path" => builder = builder.with_service_account_path(value),
                "service_account_key" => builder = builder.with_service_account_key(value),
                key if Self::is_shared_option(key) => (),
                _ => warn!("Unknown GCS option: {}", key),
            }
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to create GCS store: {}", e)))?;
        Ok(Box::new(store))
    }

    /// Stream `path` into `object` through a buffered multipart writer.
    async fn stream_upload(
        store: Arc<dyn ObjectStore>,
        path: &Path,
        object: &str,
    ) -> StorageResult<u64> {
        let mut file = File::open(path)
            .await
            .map_err(|e| StorageError::local_io(path, e))?;
        let mut writer = BufWriter::new(store, string_to_path(object));
        let mut buf = BytesMut::with_capacity(UPLOAD_CHUNK_SIZE);
        let mut total: u64 = 0;

        loop {
            let read = match file.read_buf(&mut buf).await {
                Ok(read) => read,
                Err(e) => {
                    Self::abort_upload(&mut writer, object).await;
                    return Err(StorageError::local_io(path, e));
                }
            };
            if read == 0 {
                break;
            }
            total += read as u64;

            if buf.len() >= UPLOAD_CHUNK_SIZE {
                if let Err(e) = writer.put(buf.split().freeze()).await {
                    Self::abort_upload(&mut writer, object).await;
                    return Err(StorageError::transfer(object, e));
                }
                buf.reserve(UPLOAD_CHUNK_SIZE);
            }
        }

        if !buf.is_empty() {
            if let Err(e) = writer.put(buf.split().freeze()).await {
                Self::abort_upload(&mut writer, object).await;
                return Err(StorageError::transfer(object, e));
            }
        }

        // Finalize the remote write
        if let Err(e) = writer.shutdown().await {
            Self::abort_upload(&mut writer, object).await;
            return Err(StorageError::transfer(object, e));
        }

        Ok(total)
    }

    async fn abort_upload(writer: &mut BufWriter, object: &str) {
        if let Err(e) = writer.abort().await {
            warn!("Failed to abort upload of object={}: {}", object, e);
        }
    }

    /// Copy `object` into a new temp file, `None` on not-found.
    async fn stream_download(
        store: Arc<dyn ObjectStore>,
        object: &str,
        download_dir: &Path,
        prefix: &str,
    ) -> StorageResult<Option<(PathBuf, u64)>> {
        let result = match store.get(&string_to_path(object)).await {
            Ok(result) => result,
            Err(e) if is_not_found(&e) => return Ok(None),
            Err(e) => return Err(StorageError::transfer(object, e)),
        };

        // Only create the local file once the object is known to exist
        let target = PartialDownload::create(download_dir, prefix)?;
        Self::copy_to_local(result.into_stream(), target, object).await
    }

    /// Drain `stream` into `target`, removing the file on any failure.
    ///
    /// A not-found reported mid-stream yields `None` like one reported by `get`.
    async fn copy_to_local<S>(
        mut stream: S,
        mut target: PartialDownload,
        object: &str,
    ) -> StorageResult<Option<(PathBuf, u64)>>
    where
        S: Stream<Item = object_store::Result<Bytes>> + Unpin + Send,
    {
        let mut total: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(bytes) => bytes,
                Err(e) if is_not_found(&e) => {
                    target.discard();
                    return Ok(None);
                }
                Err(e) => {
                    target.discard();
                    return Err(StorageError::transfer(object, e));
                }
            };
            if let Err(e) = target.write(&bytes).await {
                target.discard();
                return Err(e);
            }
            total += bytes.len() as u64;
        }

        let path = target.finish().await?;
        Ok(Some((path, total)))
    }
}

#[async_trait]
impl BlobStore for ObjectStoreClient {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn upload(&self, path: &Path, object: &str) -> StorageResult<()> {
        require_non_empty_path("path", path)?;
        require_non_empty("object", object)?;
        let store = self.handle().await?;

        let operation = format!("upload({})", object);
        let total = with_deadline(
            &operation,
            self.timeout,
            Self::stream_upload(store, path, object),
        )
        .await?;

        debug!(
            "Uploaded file={} to object={}, bucket={}, bytes={}",
            path.display(),
            object,
            self.bucket,
            total
        );
        Ok(())
    }

    async fn download(&self, object: &str, path: &Path) -> StorageResult<Option<PathBuf>> {
        require_non_empty("object", object)?;
        require_non_empty_path("path", path)?;
        let prefix = temp_prefix(path)?;
        let store = self.handle().await?;

        let operation = format!("download({})", object);
        let downloaded = with_deadline(
            &operation,
            self.timeout,
            Self::stream_download(store, object, &self.download_dir, &prefix),
        )
        .await?;

        match downloaded {
            Some((local, total)) => {
                debug!(
                    "Downloaded object={} to file={}, bucket={}, bytes={}",
                    object,
                    local.display(),
                    self.bucket,
                    total
                );
                Ok(Some(local))
            }
            None => {
                debug!("Object not found object={}, bucket={}", object, self.bucket);
                Ok(None)
            }
        }
    }

    async fn exists(&self, object: &str) -> StorageResult<bool> {
        require_non_empty("object", object)?;
        let store = self.handle().await?;
        let location = string_to_path(object);

        let operation = format!("exists({})", object);
        with_deadline(&operation, self.timeout, async {
            match store.head(&location).await {
                Ok(_) => Ok(true),
                Err(e) if is_not_found(&e) => Ok(false),
                Err(e) => Err(StorageError::transfer(object, e)),
            }
        })
        .await
    }

    /// In-flight operations keep their own reference to the store until they finish.
    async fn close(&self) -> StorageResult<()> {
        let mut handle = self.handle.write().await;
        match handle.take() {
            Some(store) => {
                drop(store);
                info!(
                    "Closed blob store client type={}, bucket={}",
                    self.config.storage_type_str(),
                    self.bucket
                );
                Ok(())
            }
            None => Err(StorageError::CloseError(format!(
                "client for bucket '{}' is already closed",
                self.bucket
            ))),
        }
    }
}

impl Debug for ObjectStoreClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ObjectStoreClient(type={}, bucket={}, timeout={:?}, download_dir={})",
            self.config.storage_type_str(),
            self.bucket,
            self.timeout,
            self.download_dir.display()
        )
    }
}
