// In-memory object store for local runs and tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use tokio::sync::RwLock;
use tracing::debug;

use super::{ObjectStore, StoreResult, StoredObject};
use crate::models::DocumentLocation;

const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

#[derive(Debug, Clone)]
struct MemoryObject {
    data: Bytes,
    content_type: String,
}

/// HashMap-backed object store.
///
/// Reads snapshot the stored bytes and hand them out in `chunk_size` pieces,
/// so consumers see the same multi-chunk delivery a network store produces.
/// Call counters let tests check which operations a handler performed.
pub struct MemoryStore {
    objects: RwLock<HashMap<DocumentLocation, MemoryObject>>,
    chunk_size: usize,
    gets: AtomicUsize,
    puts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            chunk_size: DEFAULT_CHUNK_SIZE,
            gets: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
        }
    }

    /// Create a store already holding one `text/plain` object.
    pub fn with_document(location: DocumentLocation, content: impl Into<Bytes>) -> Self {
        let mut objects = HashMap::new();
        objects.insert(
            location,
            MemoryObject {
                data: content.into(),
                content_type: mime::TEXT_PLAIN.to_string(),
            },
        );

        Self {
            objects: RwLock::new(objects),
            ..Self::new()
        }
    }

    /// Split object bodies into chunks of at most `chunk_size` bytes on read.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Current bytes stored at `location`, bypassing the call counters.
    pub async fn contents(&self, location: &DocumentLocation) -> Option<Bytes> {
        self.objects
            .read()
            .await
            .get(location)
            .map(|object| object.data.clone())
    }

    /// Content type stored at `location`.
    pub async fn content_type(&self, location: &DocumentLocation) -> Option<String> {
        self.objects
            .read()
            .await
            .get(location)
            .map(|object| object.content_type.clone())
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    fn chunks(&self, data: &Bytes) -> Vec<Bytes> {
        (0..data.len())
            .step_by(self.chunk_size)
            .map(|start| data.slice(start..(start + self.chunk_size).min(data.len())))
            .collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get_object(&self, location: &DocumentLocation) -> StoreResult<Option<StoredObject>> {
        self.gets.fetch_add(1, Ordering::SeqCst);

        let object = match self.objects.read().await.get(location) {
            Some(object) => object.clone(),
            None => return Ok(None),
        };

        let chunks = self.chunks(&object.data);
        debug!(location = %location, chunks = chunks.len(), "serving object from memory");

        Ok(Some(StoredObject {
            content_length: Some(object.data.len() as i64),
            content_type: Some(object.content_type),
            body: stream::iter(chunks.into_iter().map(Ok)).boxed(),
        }))
    }

    async fn put_object(
        &self,
        location: &DocumentLocation,
        body: Bytes,
        content_type: &str,
    ) -> StoreResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);

        self.objects.write().await.insert(
            location.clone(),
            MemoryObject {
                data: body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    fn location() -> DocumentLocation {
        DocumentLocation::default()
    }

    #[tokio::test]
    async fn test_missing_object_is_none() {
        let store = MemoryStore::new();
        let object = store.get_object(&location()).await.unwrap();
        assert!(object.is_none());
        assert_eq!(store.get_count(), 1);
    }

    #[tokio::test]
    async fn test_body_is_delivered_in_chunks() {
        let store = MemoryStore::with_document(location(), "abcdefg").with_chunk_size(3);
        let object = store.get_object(&location()).await.unwrap().unwrap();

        assert_eq!(object.content_length, Some(7));
        assert_eq!(object.content_type.as_deref(), Some("text/plain"));

        let chunks: Vec<Bytes> = object.body.try_collect().await.unwrap();
        assert_eq!(chunks, vec!["abc", "def", "g"]);
    }

    #[tokio::test]
    async fn test_empty_object_has_no_chunks() {
        let store = MemoryStore::with_document(location(), Bytes::new());
        let object = store.get_object(&location()).await.unwrap().unwrap();

        assert_eq!(object.content_length, Some(0));
        let chunks: Vec<Bytes> = object.body.try_collect().await.unwrap();
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn test_put_replaces_content() {
        let store = MemoryStore::with_document(location(), "old\n");
        store
            .put_object(&location(), Bytes::from("new\n"), "application/octet-stream")
            .await
            .unwrap();

        assert_eq!(store.contents(&location()).await.unwrap(), "new\n");
        assert_eq!(
            store.content_type(&location()).await.as_deref(),
            Some("application/octet-stream")
        );
        assert_eq!(store.put_count(), 1);
    }

    #[tokio::test]
    async fn test_reads_are_snapshots() {
        let store = MemoryStore::with_document(location(), "before");
        let object = store.get_object(&location()).await.unwrap().unwrap();

        store
            .put_object(&location(), Bytes::from("after"), "text/plain")
            .await
            .unwrap();

        let chunks: Vec<Bytes> = object.body.try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"before");
    }
}
