use blobstore_client::{BlobStoreFactory, StorageConfig};
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // A scratch directory plays the bucket
    let bucket = tempfile::tempdir()?;
    let local = tempfile::tempdir()?;
    let source = local.path().join("report.txt");
    std::fs::write(&source, "net worth report\n")?;

    let config = StorageConfig::local(bucket.path().to_string_lossy())
        .with_timeout(Duration::from_secs(30));
    let store = BlobStoreFactory::open_with_download_dir(config, local.path()).await?;

    store.upload(&source, "report.txt").await?;
    info!("exists(report.txt)={}", store.exists("report.txt").await?);

    if let Some(downloaded) = store.download("report.txt", Path::new("report.txt")).await? {
        info!(
            "Downloaded report.txt to {} ({} bytes)",
            downloaded.display(),
            std::fs::metadata(&downloaded)?.len()
        );
    }

    let missing = store
        .download("report.txt.missing", Path::new("report.txt.missing"))
        .await?;
    info!("download(report.txt.missing) found={}", missing.is_some());

    store.close().await?;
    Ok(())
}
