use blobstore_client::{BlobStoreFactory, StorageConfig};
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Expects GOOGLE_APPLICATION_CREDENTIALS to point at a service-account key.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let bucket = "networth.leftshift.io";
    let file = "amfi-04-Jan-2022.txt";

    let config = StorageConfig::gcs(bucket)
        .with_timeout(Duration::from_secs(600))
        .with_option("validate_on_open", "true");
    let store = BlobStoreFactory::open(config).await?;

    info!("exists({})={}", file, store.exists(file).await?);

    store.upload(Path::new(&format!("./{}", file)), file).await?;

    match store.download(file, Path::new(file)).await? {
        Some(local) => info!("Downloaded {} to {}", file, local.display()),
        None => info!("{} not found in {}", file, bucket),
    }

    let missing = format!("{}2", file);
    let result = store.download(&missing, Path::new(&missing)).await?;
    info!("download({}) found={}", missing, result.is_some());

    store.close().await?;
    Ok(())
}
