// S3 client backed by rust-s3

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use s3::Bucket;
use tracing::{debug, instrument};

use super::{ObjectStore, StoreError, StoreResult, StoredObject};
use crate::config::StorageConfig;
use crate::models::DocumentLocation;

/// S3-compatible object store.
///
/// A `Bucket` handle is built per request from the shared region and
/// credentials, since the location names the bucket.
#[derive(Clone)]
pub struct S3Store {
    region: Region,
    credentials: Credentials,
    path_style: bool,
}

impl S3Store {
    pub fn new(region: Region, credentials: Credentials, path_style: bool) -> Self {
        Self {
            region,
            credentials,
            path_style,
        }
    }

    /// Build a client from configuration.
    ///
    /// Without explicit keys, rust-s3 falls back to its provider chain
    /// (environment, profile, instance metadata).
    pub fn from_config(config: &StorageConfig) -> StoreResult<Self> {
        let region = match &config.s3_endpoint {
            Some(endpoint) => Region::Custom {
                region: config.s3_region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config.s3_region.parse().map_err(|e| {
                StoreError::Config(format!("invalid region {}: {}", config.s3_region, e))
            })?,
        };

        let credentials = Credentials::new(
            config.s3_access_key_id.as_deref(),
            config.s3_secret_access_key.as_deref(),
            None,
            config.s3_session_token.as_deref(),
            None,
        )
        .map_err(|e| StoreError::Config(format!("failed to load credentials: {}", e)))?;

        Ok(Self::new(region, credentials, config.s3_path_style))
    }

    fn bucket(&self, name: &str) -> StoreResult<Bucket> {
        let mut bucket = Bucket::new(name, self.region.clone(), self.credentials.clone())
            .map_err(|e| StoreError::Config(format!("invalid bucket {}: {}", name, e)))?;

        if self.path_style {
            bucket = bucket.with_path_style();
        }

        Ok(bucket)
    }
}

/// Whether rust-s3 reported a 404 for the request.
fn is_not_found(error: &S3Error) -> bool {
    matches!(error, S3Error::HttpFailWithBody(404, _))
}

fn backend(operation: &'static str, error: S3Error) -> StoreError {
    StoreError::Backend {
        operation,
        source: Box::new(error),
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Content length and type exactly as the response headers report them.
fn object_metadata(headers: &HashMap<String, String>) -> (Option<i64>, Option<String>) {
    let content_length = headers
        .get("content-length")
        .and_then(|value| value.parse::<i64>().ok());
    let content_type = headers.get("content-type").cloned();
    (content_length, content_type)
}

#[async_trait]
impl ObjectStore for S3Store {
    #[instrument(skip(self, location), fields(location = %location))]
    async fn get_object(&self, location: &DocumentLocation) -> StoreResult<Option<StoredObject>> {
        let bucket = self.bucket(&location.bucket)?;

        let response = match bucket.get_object(&location.key).await {
            Ok(response) => response,
            Err(e) if is_not_found(&e) => return Ok(None),
            Err(e) => return Err(backend("GetObject", e)),
        };

        match response.status_code() {
            404 => return Ok(None),
            status if !is_success(status) => {
                return Err(StoreError::Status {
                    operation: "GetObject",
                    status,
                })
            }
            _ => {}
        }

        let (content_length, content_type) = object_metadata(&response.headers());
        let data = Bytes::from(response.bytes().to_vec());

        debug!(?content_length, ?content_type, "fetched object");

        Ok(Some(StoredObject {
            content_length,
            content_type,
            body: stream::once(async move { Ok(data) }).boxed(),
        }))
    }

    #[instrument(skip(self, location, body), fields(location = %location, bytes = body.len()))]
    async fn put_object(
        &self,
        location: &DocumentLocation,
        body: Bytes,
        content_type: &str,
    ) -> StoreResult<()> {
        let bucket = self.bucket(&location.bucket)?;

        let response = bucket
            .put_object_with_content_type(&location.key, &body, content_type)
            .await
            .map_err(|e| backend("PutObject", e))?;

        let status = response.status_code();
        if !is_success(status) {
            return Err(StoreError::Status {
                operation: "PutObject",
                status,
            });
        }

        debug!(status, "stored object");
        Ok(())
    }
}
