use std::sync::Arc;

use crate::storage::ObjectStore;

/// Bucket holding the document.
pub const DOCUMENT_BUCKET: &str = "doc-store-documents";

/// Key of the document within [`DOCUMENT_BUCKET`].
pub const DOCUMENT_KEY: &str = "list.txt";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub location: DocumentLocation,
}

impl AppState {
    /// State pointing at the fixed document location.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            location: DocumentLocation::default(),
        }
    }
}

/// Bucket and key addressing one object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentLocation {
    pub bucket: String,
    pub key: String,
}

impl DocumentLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl Default for DocumentLocation {
    fn default() -> Self {
        Self::new(DOCUMENT_BUCKET, DOCUMENT_KEY)
    }
}

impl std::fmt::Display for DocumentLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// The document as read from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub content: String,
    /// Byte length reported by the store.
    pub length: Option<i64>,
    /// Content type reported by the store.
    pub content_type: Option<String>,
}
