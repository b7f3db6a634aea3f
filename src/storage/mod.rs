//! Object Storage
//!
//! The document lives in an external key-addressed object store. Handlers
//! only ever talk to the [`ObjectStore`] trait so the backend can be swapped:
//! - [`S3Store`] - S3-compatible storage via rust-s3
//! - [`MemoryStore`] - in-process storage for local runs and tests

pub mod memory;
pub mod s3_client;

pub use memory::*;
pub use s3_client::*;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::config::{StorageConfig, StorageProvider};
use crate::models::DocumentLocation;

/// Body of a fetched object, delivered as a sequence of byte chunks.
pub type ByteStream = BoxStream<'static, Result<Bytes, StoreError>>;

/// An object returned by [`ObjectStore::get_object`].
pub struct StoredObject {
    /// Length in bytes as reported by the store.
    pub content_length: Option<i64>,
    /// Content type as reported by the store.
    pub content_type: Option<String>,
    pub body: ByteStream,
}

impl std::fmt::Debug for StoredObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredObject")
            .field("content_length", &self.content_length)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Errors from the storage boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{operation} request failed")]
    Backend {
        operation: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{operation} request returned HTTP {status}")]
    Status { operation: &'static str, status: u16 },

    #[error("storage misconfigured: {0}")]
    Config(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Key-addressed object storage.
///
/// Absence is not an error: `get_object` returns `Ok(None)` when nothing is
/// stored at the location, whatever way the backend signals it.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object's metadata and body stream.
    async fn get_object(&self, location: &DocumentLocation) -> StoreResult<Option<StoredObject>>;

    /// Write an object, replacing anything previously stored at the location.
    async fn put_object(
        &self,
        location: &DocumentLocation,
        body: Bytes,
        content_type: &str,
    ) -> StoreResult<()>;
}

/// Build the configured backend.
///
/// The memory backend starts with an empty document so local runs behave as
/// if the object had been provisioned.
pub fn from_config(
    config: &StorageConfig,
    location: &DocumentLocation,
) -> StoreResult<Arc<dyn ObjectStore>> {
    match config.provider {
        StorageProvider::S3 => Ok(Arc::new(S3Store::from_config(config)?)),
        StorageProvider::Memory => Ok(Arc::new(MemoryStore::with_document(
            location.clone(),
            Bytes::new(),
        ))),
    }
}
