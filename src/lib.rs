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

//! # Blobstore Client
//!
//! A Rust library for moving whole files between the local filesystem and a
//! single remote bucket.
//!
//! The client exposes four operations: upload, download, exists and close.
//! Each call runs under its own deadline, and a missing object is reported as
//! a value rather than an error.
//!
//! ## Features
//!
//! - **Backends**: Google Cloud Storage, AWS S3, Azure Blob Storage, local filesystem, in-memory
//! - **Explicit credentials**: the credential source is part of the configuration
//! - **Streaming transfers**: files are never buffered whole in memory
//! - **Per-call deadlines**: a slow call fails with `DeadlineExceeded` and cleans up after itself
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use blobstore_client::{BlobStoreFactory, StorageConfig};
//! use std::path::Path;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! // Credentials come from GOOGLE_APPLICATION_CREDENTIALS
//! let config = StorageConfig::gcs("networth.leftshift.io")
//!     .with_timeout(Duration::from_secs(600));
//! let store = BlobStoreFactory::open(config).await?;
//!
//! store.upload(Path::new("./report.txt"), "report.txt").await?;
//!
//! match store.download("report.txt", Path::new("report.txt")).await? {
//!     Some(local) => println!("Downloaded to {}", local.display()),
//!     None => println!("No such object"),
//! }
//!
//! store.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`storage`] - Client trait, configuration, credentials and errors
//! - [`util`] - Deadlines and local temp file handling

pub mod storage;
pub mod util;

// Re-export commonly used types
pub use storage::{
    BlobStore, BlobStoreFactory, CredentialSource, ObjectStoreClient, StorageConfig,
    StorageError, StorageResult, StorageType,
};
