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

use crate::storage::error::{StorageError, StorageResult};
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Derive the temp file name prefix from a requested download path.
///
/// Only the final component is used, so `reports/report.txt` yields
/// `report.txt`. Paths without a file name (`/`, `..`) are rejected.
pub fn temp_prefix(requested: &Path) -> StorageResult<String> {
    requested
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            StorageError::InvalidArgument(format!(
                "path has no file name: {}",
                requested.display()
            ))
        })
}

/// A local temp file being filled by a download.
///
/// The file is removed when this value is dropped or discarded, unless
/// [`PartialDownload::finish`] ran to completion.
pub struct PartialDownload {
    file: File,
    path: TempPath,
}

impl PartialDownload {
    /// Create `<dir>/<prefix><random>`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::LocalIoError`] if the file cannot be created.
    pub fn create(dir: &Path, prefix: &str) -> StorageResult<Self> {
        let named = tempfile::Builder::new()
            .prefix(prefix)
            .tempfile_in(dir)
            .map_err(|e| StorageError::local_io(dir.join(prefix), e))?;
        let (file, path) = named.into_parts();

        Ok(Self {
            file: File::from_std(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write(&mut self, chunk: &[u8]) -> StorageResult<()> {
        self.file
            .write_all(chunk)
            .await
            .map_err(|e| StorageError::local_io(&self.path, e))
    }

    /// Flush, close and keep the file.
    ///
    /// On failure the file is removed before the error is returned.
    pub async fn finish(self) -> StorageResult<PathBuf> {
        let PartialDownload { mut file, path } = self;

        if let Err(e) = file.flush().await {
            let err = StorageError::local_io(&path, e);
            drop(file);
            discard_path(path);
            return Err(err);
        }
        drop(file);

        path.keep()
            .map_err(|e| StorageError::local_io(&e.path, e.error))
    }

    /// Remove the partial file, logging rather than returning removal failures.
    pub fn discard(self) {
        let PartialDownload { file, path } = self;
        drop(file);
        discard_path(path);
    }
}

fn discard_path(path: TempPath) {
    let removed = path.to_path_buf();
    if let Err(e) = path.close() {
        warn!(
            "Failed to remove partial download file={}: {}",
            removed.display(),
            e
        );
    }
}
