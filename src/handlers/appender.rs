// POST: append one line to the document
//
// This is an unguarded read-modify-write. Two appends that read the same
// version both write back their own line and the later write wins.

use bytes::Bytes;
use tracing::{error, info, instrument};

use crate::models::{AppState, DocumentLocation};
use crate::storage::ObjectStore;
use crate::types::{DocError, DocResult, ProxyEvent, ProxyResponse};

use super::read_document;

/// Append `line` plus a newline to the document and write it back.
///
/// A missing document is an error; it is never created here.
pub async fn append_line(
    store: &dyn ObjectStore,
    location: &DocumentLocation,
    line: &str,
) -> DocResult<()> {
    let document = read_document(store, location)
        .await?
        .ok_or_else(|| DocError::DocumentMissing(location.clone()))?;

    let mut content = document.content;
    content.push_str(line);
    content.push('\n');

    store
        .put_object(location, Bytes::from(content), mime::TEXT_PLAIN.as_ref())
        .await?;

    Ok(())
}

async fn append_event(state: &AppState, event: &ProxyEvent) -> DocResult<String> {
    // TODO: cap the accepted body size once the API Gateway payload limit is settled
    let line = event.text_body()?;
    append_line(state.store.as_ref(), &state.location, &line).await?;
    Ok(line)
}

#[instrument(skip_all, fields(location = %state.location))]
pub async fn add_document(state: &AppState, event: &ProxyEvent) -> ProxyResponse {
    match append_event(state, event).await {
        Ok(line) => {
            info!(bytes = line.len(), "Line appended");
            ProxyResponse::message(200, format!("added: {}", line))
        }
        Err(e) => {
            error!("Failed to append to document: {:#}", anyhow::Error::new(e));
            ProxyResponse::internal_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{Failure, FailingStore};
    use crate::storage::{MemoryStore, StoreResult, StoredObject};
    use crate::types::INTERNAL_ERROR_MESSAGE;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Barrier;

    fn location() -> DocumentLocation {
        DocumentLocation::default()
    }

    fn message(response: &ProxyResponse) -> String {
        let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        body["message"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_appends_line_and_confirms() {
        let store = Arc::new(MemoryStore::with_document(location(), "foo\n"));
        let state = AppState::new(store.clone());

        let response = add_document(&state, &ProxyEvent::new("POST").with_body("hello")).await;

        assert_eq!(response.status_code, 200);
        assert!(message(&response).contains("hello"));
        assert_eq!(store.contents(&location()).await.unwrap(), "foo\nhello\n");
        assert_eq!(store.content_type(&location()).await.as_deref(), Some("text/plain"));
    }

    #[tokio::test]
    async fn test_successive_appends_keep_order() {
        let store = Arc::new(MemoryStore::with_document(location(), "").with_chunk_size(2));
        let state = AppState::new(store.clone());

        for line in ["one", "two", "three"] {
            let response = add_document(&state, &ProxyEvent::new("POST").with_body(line)).await;
            assert_eq!(response.status_code, 200);
        }

        assert_eq!(store.contents(&location()).await.unwrap(), "one\ntwo\nthree\n");
    }

    #[tokio::test]
    async fn test_missing_body_appends_empty_line() {
        let store = Arc::new(MemoryStore::with_document(location(), "foo\n"));
        let state = AppState::new(store.clone());

        let response = add_document(&state, &ProxyEvent::new("POST")).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(store.contents(&location()).await.unwrap(), "foo\n\n");
    }

    #[tokio::test]
    async fn test_base64_body_is_decoded() {
        let store = Arc::new(MemoryStore::with_document(location(), "foo\n"));
        let state = AppState::new(store.clone());

        let mut event = ProxyEvent::new("POST").with_body("aGVsbG8=");
        event.is_base64_encoded = true;

        let response = add_document(&state, &event).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(store.contents(&location()).await.unwrap(), "foo\nhello\n");
    }

    #[tokio::test]
    async fn test_invalid_base64_is_500_and_leaves_document() {
        let store = Arc::new(MemoryStore::with_document(location(), "foo\n"));
        let state = AppState::new(store.clone());

        let mut event = ProxyEvent::new("POST").with_body("%%%");
        event.is_base64_encoded = true;

        let response = add_document(&state, &event).await;
        assert_eq!(response.status_code, 500);
        assert_eq!(store.get_count(), 0);
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_document_is_500_and_not_created() {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone());

        let response = add_document(&state, &ProxyEvent::new("POST").with_body("hello")).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(message(&response), INTERNAL_ERROR_MESSAGE);
        assert!(store.contents(&location()).await.is_none());
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn test_append_line_reports_missing_document() {
        let store = MemoryStore::new();
        let error = append_line(&store, &location(), "hello").await.unwrap_err();
        assert!(matches!(error, DocError::DocumentMissing(ref missing) if *missing == location()));
    }

    #[tokio::test]
    async fn test_write_failure_is_500() {
        let inner = MemoryStore::with_document(location(), "foo\n");
        let state = AppState::new(Arc::new(FailingStore::new(inner, Failure::Put)));

        let response = add_document(&state, &ProxyEvent::new("POST").with_body("hello")).await;
        assert_eq!(response.status_code, 500);
        assert_eq!(message(&response), INTERNAL_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_stream_failure_skips_write() {
        let store = Arc::new(FailingStore::new(
            MemoryStore::with_document(location(), "foo\n"),
            Failure::Body,
        ));
        let state = AppState::new(store.clone());

        let response = add_document(&state, &ProxyEvent::new("POST").with_body("hello")).await;
        assert_eq!(response.status_code, 500);
        assert_eq!(store.inner.put_count(), 0);
        assert_eq!(store.inner.contents(&location()).await.unwrap(), "foo\n");
    }

    /// Holds every reader at a barrier after its fetch, so all appends see
    /// the same version before any of them writes.
    struct LockstepStore {
        inner: MemoryStore,
        barrier: Barrier,
    }

    #[async_trait]
    impl ObjectStore for LockstepStore {
        async fn get_object(&self, location: &DocumentLocation) -> StoreResult<Option<StoredObject>> {
            let object = self.inner.get_object(location).await?;
            self.barrier.wait().await;
            Ok(object)
        }

        async fn put_object(
            &self,
            location: &DocumentLocation,
            body: Bytes,
            content_type: &str,
        ) -> StoreResult<()> {
            self.inner.put_object(location, body, content_type).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_appends_can_lose_a_line() {
        let store = Arc::new(LockstepStore {
            inner: MemoryStore::with_document(location(), "foo\n"),
            barrier: Barrier::new(2),
        });
        let state = AppState::new(store.clone());

        let first = ProxyEvent::new("POST").with_body("a");
        let second = ProxyEvent::new("POST").with_body("b");
        let (r1, r2) = tokio::join!(add_document(&state, &first), add_document(&state, &second));

        assert_eq!(r1.status_code, 200);
        assert_eq!(r2.status_code, 200);
        assert_eq!(store.inner.put_count(), 2);

        let stored = store.inner.contents(&location()).await.unwrap();
        assert!(
            stored == "foo\na\n" || stored == "foo\nb\n",
            "one append should have been overwritten, got {:?}",
            stored
        );
    }
}
