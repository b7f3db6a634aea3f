// GET: return the whole document

use tracing::{error, info, instrument};

use crate::models::{AppState, Document, DocumentLocation};
use crate::storage::ObjectStore;
use crate::types::{DocResult, ProxyResponse};
use crate::utils::drain_to_string;

/// Fetch and decode the document. `Ok(None)` when the object is absent.
pub async fn read_document(
    store: &dyn ObjectStore,
    location: &DocumentLocation,
) -> DocResult<Option<Document>> {
    let Some(object) = store.get_object(location).await? else {
        return Ok(None);
    };

    let content = drain_to_string(object.body).await?;

    Ok(Some(Document {
        content,
        length: object.content_length,
        content_type: object.content_type,
    }))
}

#[instrument(skip_all, fields(location = %state.location))]
pub async fn get_document(state: &AppState) -> ProxyResponse {
    match read_document(state.store.as_ref(), &state.location).await {
        Ok(Some(document)) => {
            info!(length = ?document.length, "Document read");
            ProxyResponse::document(&document)
        }
        Ok(None) => ProxyResponse::not_found(),
        Err(e) => {
            error!("Failed to read document: {:#}", anyhow::Error::new(e));
            ProxyResponse::internal_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{Failure, FailingStore};
    use crate::storage::MemoryStore;
    use crate::types::{INTERNAL_ERROR_MESSAGE, NOT_FOUND_MESSAGE};
    use std::sync::Arc;

    fn body(response: &ProxyResponse) -> serde_json::Value {
        serde_json::from_str(&response.body).unwrap()
    }

    #[tokio::test]
    async fn test_returns_content_and_metadata() {
        let content = "first line\nsecond line\n";
        let store = MemoryStore::with_document(DocumentLocation::default(), content).with_chunk_size(4);
        let state = AppState::new(Arc::new(store));

        let response = get_document(&state).await;
        assert_eq!(response.status_code, 200);

        let body = body(&response);
        assert_eq!(body["message"], content);
        assert_eq!(body["length"], content.len() as i64);
        assert_eq!(body["type"], "text/plain");
    }

    #[tokio::test]
    async fn test_empty_document() {
        let store = MemoryStore::with_document(DocumentLocation::default(), "");
        let state = AppState::new(Arc::new(store));

        let response = get_document(&state).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(body(&response)["message"], "");
        assert_eq!(body(&response)["length"], 0);
    }

    #[tokio::test]
    async fn test_missing_document_is_404() {
        let state = AppState::new(Arc::new(MemoryStore::new()));

        let response = get_document(&state).await;
        assert_eq!(response.status_code, 404);
        assert_eq!(body(&response)["message"], NOT_FOUND_MESSAGE);
    }

    #[tokio::test]
    async fn test_only_the_fixed_location_is_read() {
        let elsewhere = DocumentLocation::new("doc-store-documents", "other.txt");
        let state = AppState::new(Arc::new(MemoryStore::with_document(elsewhere, "nope\n")));

        let response = get_document(&state).await;
        assert_eq!(response.status_code, 404);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_500() {
        let inner = MemoryStore::with_document(DocumentLocation::default(), "foo\n");
        let state = AppState::new(Arc::new(FailingStore::new(inner, Failure::Get)));

        let response = get_document(&state).await;
        assert_eq!(response.status_code, 500);
        assert_eq!(body(&response)["message"], INTERNAL_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_stream_failure_is_500_without_partial_content() {
        let inner = MemoryStore::with_document(DocumentLocation::default(), "foo\n");
        let state = AppState::new(Arc::new(FailingStore::new(inner, Failure::Body)));

        let response = get_document(&state).await;
        assert_eq!(response.status_code, 500);
        assert!(!response.body.contains("partial"));
    }

    #[tokio::test]
    async fn test_read_document_reports_drain_errors() {
        let inner = MemoryStore::with_document(DocumentLocation::default(), "foo\n");
        let store = FailingStore::new(inner, Failure::Body);

        let error = read_document(&store, &DocumentLocation::default())
            .await
            .unwrap_err();
        assert!(matches!(error, crate::types::DocError::Drain(_)));
    }
}
