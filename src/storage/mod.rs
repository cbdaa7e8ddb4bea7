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

//! Blob storage abstraction layer
//!
//! This module provides a single-bucket client interface over Google Cloud
//! Storage, AWS S3, Azure Blob Storage, the local filesystem and an in-memory
//! store.
//!
//! All backends are served by one client built on the `object_store` crate.
//! Callers program against [`BlobStore`]; tests swap in the in-memory backend.

pub mod config;
pub mod credentials;
pub mod error;
pub mod factory;
pub mod object_store;
pub mod provider;

// Public exports
pub use config::{StorageConfig, StorageType};
pub use credentials::CredentialSource;
pub use error::{StorageError, StorageResult};
pub use factory::BlobStoreFactory;
pub use object_store::{ObjectStoreClient, ObjectStoreClientBuilder};
pub use provider::BlobStore;
