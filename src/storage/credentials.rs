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

use super::config::StorageType;
use super::error::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable conventionally pointing at a GCS service-account key file.
pub const GOOGLE_APPLICATION_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Where the client finds backend credentials.
///
/// The source is passed into construction explicitly and resolved before any
/// backend is built, so a missing credential fails fast with
/// [`StorageError::ConfigError`] and no network call is attempted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum CredentialSource {
    /// No credentials. Only accepted by the local and in-memory backends.
    #[default]
    Anonymous,
    /// The named environment variable must be set and non-empty.
    ///
    /// For GCS its value is the path of an Application Default Credentials file
    /// (a service-account key or an `authorized_user` file). For AWS and Azure
    /// the backend builder then loads its standard environment variables.
    Environment { variable: String },
    /// A service-account key file on disk (GCS only).
    File { path: PathBuf },
    /// Credentials are carried in the configuration options map.
    Options,
}

/// A credential source after it has been checked against the process state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedCredential {
    None,
    Environment { variable: String, value: String },
    ServiceAccountPath(PathBuf),
    Options,
}

impl CredentialSource {
    pub fn environment(variable: impl Into<String>) -> Self {
        Self::Environment {
            variable: variable.into(),
        }
    }

    /// The default GCS lookup through `GOOGLE_APPLICATION_CREDENTIALS`.
    pub fn google_application_credentials() -> Self {
        Self::environment(GOOGLE_APPLICATION_CREDENTIALS)
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File { path: path.into() }
    }

    /// The source used when a configuration names none.
    ///
    /// GCS reads `GOOGLE_APPLICATION_CREDENTIALS`, AWS and Azure read the
    /// options map, and the local and in-memory backends need nothing.
    pub fn default_for(storage_type: &StorageType) -> Self {
        match storage_type {
            StorageType::Gcs => Self::google_application_credentials(),
            StorageType::Aws | StorageType::Azure => Self::Options,
            StorageType::Local | StorageType::Memory => Self::Anonymous,
        }
    }

    /// Resolve this source for the given backend.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ConfigError`] if:
    /// * a cloud backend is configured with [`CredentialSource::Anonymous`]
    /// * the environment variable is unset or empty
    /// * a credential file is used with a backend other than GCS, or does not exist
    pub fn resolve(&self, storage_type: &StorageType) -> StorageResult<ResolvedCredential> {
        if !storage_type.is_remote() {
            return Ok(ResolvedCredential::None);
        }

        match self {
            Self::Anonymous => Err(StorageError::ConfigError(format!(
                "No credential source configured for {} storage",
                storage_type.as_str()
            ))),
            Self::Environment { variable } => match std::env::var(variable) {
                Ok(value) if !value.trim().is_empty() => Ok(ResolvedCredential::Environment {
                    variable: variable.clone(),
                    value,
                }),
                _ => Err(StorageError::ConfigError(format!(
                    "{} was not found in the environment",
                    variable
                ))),
            },
            Self::File { path } => {
                if *storage_type != StorageType::Gcs {
                    return Err(StorageError::ConfigError(format!(
                        "Credential files are only supported for gcs storage, not {}",
                        storage_type.as_str()
                    )));
                }
                if !path.is_file() {
                    return Err(StorageError::ConfigError(format!(
                        "Credential file does not exist: {}",
                        path.display()
                    )));
                }
                Ok(ResolvedCredential::ServiceAccountPath(path.clone()))
            }
            Self::Options => Ok(ResolvedCredential::Options),
        }
    }
}
