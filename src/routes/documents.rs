use axum::{extract::State, http::Method, Router};
use bytes::Bytes;
use tracing::debug;

use crate::handlers::handle_event;
use crate::models::AppState;
use crate::types::{ProxyEvent, ProxyResponse};

/// Catch-all router feeding the document function.
pub fn router() -> Router<AppState> {
    Router::new().fallback(proxy_request)
}

/// Translate an HTTP request into the event shape an API gateway delivers.
/// An empty body is reported as absent, as the gateway does.
fn to_event(method: &Method, body: &Bytes) -> ProxyEvent {
    ProxyEvent {
        http_method: Some(method.as_str().to_string()),
        body: (!body.is_empty()).then(|| String::from_utf8_lossy(body).into_owned()),
        is_base64_encoded: false,
    }
}

pub(crate) async fn proxy_request(State(state): State<AppState>, method: Method, body: Bytes) -> ProxyResponse {
    debug!(%method, bytes = body.len(), "Proxying request to document function");
    handle_event(&state, to_event(&method, &body)).await
}
