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

use async_trait::async_trait;
use object_store::path::Path as ObjectPath;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::StorageResult;

/// Uniform interface over a remote blob store scoped to one bucket.
///
/// Every upload, download and exists call runs under its own deadline derived
/// from [`BlobStore::timeout`] at call start. Calls may run concurrently on one
/// instance; each opens its own stream against the backend. Nothing is retried.
///
/// Once [`BlobStore::close`] has succeeded, every other operation returns
/// [`StorageError::Closed`](super::error::StorageError::Closed).
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// The bucket this client is scoped to.
    fn bucket(&self) -> &str;

    /// The deadline applied to each operation.
    fn timeout(&self) -> Duration;

    /// Stream a local file to `object`, creating or overwriting it.
    ///
    /// # Arguments
    ///
    /// * `path` - An existing, readable local file
    /// * `object` - The key to write within the bucket
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * `path` or `object` is empty (`InvalidArgument`, the backend is not contacted)
    /// * The local file cannot be opened or read (`LocalIoError`)
    /// * Streaming or finalizing the remote write fails (`TransferError`)
    /// * The deadline elapses (`DeadlineExceeded`)
    ///
    /// A failed upload may leave a partial object behind.
    async fn upload(&self, path: &Path, object: &str) -> StorageResult<()>;

    /// Copy `object` into a new local temp file.
    ///
    /// The temp file name starts with the file name of `path` and lives in the
    /// client's download directory, so the returned path is generally not
    /// `path` itself.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(path))` - A complete, byte-identical local copy
    /// * `Ok(None)` - The object does not exist; no local file was created
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * `object` or `path` is empty (`InvalidArgument`)
    /// * The temp file cannot be created or written (`LocalIoError`)
    /// * The backend fails for a reason other than not-found (`TransferError`)
    /// * The deadline elapses (`DeadlineExceeded`)
    ///
    /// Any partially written local file is removed before the error is returned.
    async fn download(&self, object: &str, path: &Path) -> StorageResult<Option<PathBuf>>;

    /// Check whether `object` exists with a metadata-only probe.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The object exists
    /// * `Ok(false)` - The backend reported not-found
    /// * `Err(StorageError)` - Any other failure, including the deadline elapsing
    async fn exists(&self, object: &str) -> StorageResult<bool>;

    /// Release the connection handle.
    ///
    /// Closing twice returns `CloseError`.
    async fn close(&self) -> StorageResult<()>;
}

impl Debug for dyn BlobStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "BlobStore(bucket={}, timeout={:?})",
            self.bucket(),
            self.timeout()
        )
    }
}

/// Helper function to create an ObjectPath from a string
pub(crate) fn string_to_path(s: &str) -> ObjectPath {
    ObjectPath::from(s)
}
