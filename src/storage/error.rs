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

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Boxed error carried by transfer failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Missing or unusable configuration, including an undiscoverable credential source.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The backend could not be reached while opening the client.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// A required argument was empty or malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Opening, creating, reading, writing or removing a local file failed.
    #[error("Local IO error on '{}': {source}", path.display())]
    LocalIoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backend communication failed for a reason other than not-found.
    #[error("Transfer error on object '{object}': {source}")]
    TransferError {
        object: String,
        #[source]
        source: BoxError,
    },

    /// The per-call deadline elapsed before the operation finished.
    #[error("Deadline exceeded: {operation} did not finish within {timeout:?}")]
    DeadlineExceeded { operation: String, timeout: Duration },

    /// Tearing down the connection handle failed.
    #[error("Close error: {0}")]
    CloseError(String),

    /// The client has been closed and no longer holds a connection handle.
    #[error("Client is closed")]
    Closed,
}

impl StorageError {
    pub fn local_io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::LocalIoError {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn transfer(object: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::TransferError {
            object: object.into(),
            source: source.into(),
        }
    }

    /// Returns `true` if this error is a deadline expiry.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::DeadlineExceeded { .. })
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
