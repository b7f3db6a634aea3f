//! Request Handlers
//!
//! The function body shared by every host. An event is routed on its
//! HTTP method:
//! - `GET` - return the document ([`reader`])
//! - `POST` - append the request body as a new line ([`appender`])
//!
//! Every other method gets a fixed 500. Handlers never return errors to the
//! host; failures are logged and normalized into a [`ProxyResponse`].

pub mod appender;
pub mod reader;

pub use appender::{add_document, append_line};
pub use reader::{get_document, read_document};

use tracing::debug;

use crate::models::AppState;
use crate::types::{ProxyEvent, ProxyResponse};

/// Route one event to the matching handler.
pub async fn handle_event(state: &AppState, event: ProxyEvent) -> ProxyResponse {
    match event.http_method.as_deref() {
        Some("GET") => get_document(state).await,
        Some("POST") => add_document(state, &event).await,
        other => {
            debug!(method = ?other, "Unsupported method");
            ProxyResponse::unsupported_method()
        }
    }
}
