use std::path::PathBuf;
use std::sync::Arc;

use super::config::StorageConfig;
use super::error::StorageResult;
use super::object_store::ObjectStoreClient;
use super::provider::BlobStore;

/// Factory for creating blob store clients
pub struct BlobStoreFactory;

impl BlobStoreFactory {
    /// Open a blob store client from a configuration.
    ///
    /// Every backend (GCS, AWS S3, Azure, local filesystem, in-memory) is served
    /// by the same object_store based client, so callers only see the trait.
    ///
    /// # Arguments
    ///
    /// * `config` - The storage configuration specifying the backend, bucket and timeout
    ///
    /// # Returns
    ///
    /// A `Result` containing:
    /// * `Ok(Arc<dyn BlobStore>)` - A thread-safe handle shareable across tasks
    /// * `Err(StorageError)` - If the client cannot be opened
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * The storage configuration is invalid
    /// * No credential source is discoverable
    /// * The backend cannot be reached while `validate_on_open` is set
    pub async fn open(config: StorageConfig) -> StorageResult<Arc<dyn BlobStore>> {
        let client = ObjectStoreClient::open(config).await?;
        Ok(Arc::new(client))
    }

    /// Like [`BlobStoreFactory::open`], writing downloads into `download_dir`.
    pub async fn open_with_download_dir(
        config: StorageConfig,
        download_dir: impl Into<PathBuf>,
    ) -> StorageResult<Arc<dyn BlobStore>> {
        let client = ObjectStoreClient::builder(config)
            .with_download_dir(download_dir)
            .build()
            .await?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::error::StorageError;
    use std::path::Path;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_memory() {
        let store = BlobStoreFactory::open(StorageConfig::memory()).await.unwrap();
        assert_eq!(store.bucket(), "memory");
        assert!(!store.exists("report.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_open_propagates_config_error() {
        let result = BlobStoreFactory::open(StorageConfig::gcs("")).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_open_with_download_dir() {
        let local = TempDir::new().unwrap();
        let downloads = TempDir::new().unwrap();
        let store =
            BlobStoreFactory::open_with_download_dir(StorageConfig::memory(), downloads.path())
                .await
                .unwrap();

        let source = local.path().join("report.txt");
        std::fs::write(&source, b"quarterly").unwrap();
        store.upload(&source, "reports/report.txt").await.unwrap();

        let downloaded = store
            .download("reports/report.txt", Path::new("report.txt"))
            .await
            .unwrap()
            .unwrap();
        assert!(downloaded.starts_with(downloads.path()));
        assert_eq!(std::fs::read(downloaded).unwrap(), b"quarterly");

        store.close().await.unwrap();
        assert!(matches!(
            store.exists("reports/report.txt").await,
            Err(StorageError::Closed)
        ));
    }
}
