// Event, response and error types shared by the handlers and hosts

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::models::{Document, DocumentLocation};
use crate::storage::StoreError;
use crate::utils::DrainError;

pub const UNSUPPORTED_METHOD_MESSAGE: &str = "some error happened";
pub const NOT_FOUND_MESSAGE: &str = "file does not exist";
pub const INTERNAL_ERROR_MESSAGE: &str = "internal error, check logs";

/// HTTP-shaped event delivered by the host (API Gateway proxy format).
///
/// Only the fields the router reads are modelled; everything else in the
/// payload is ignored. Fields of the wrong JSON type read as absent, so a
/// malformed method still reaches the router and gets its fixed 500.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEvent {
    #[serde(default, deserialize_with = "lenient_string")]
    pub http_method: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_base64_encoded: bool,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

impl ProxyEvent {
    /// Build an event from a raw host payload. A payload that is not an
    /// object yields an event with no method.
    pub fn from_payload(payload: Value) -> Self {
        serde_json::from_value(payload).unwrap_or_else(|e| {
            debug!("Unreadable event payload: {}", e);
            Self::default()
        })
    }

    pub fn new(method: impl Into<String>) -> Self {
        Self {
            http_method: Some(method.into()),
            ..Self::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// The request body as text, decoding base64 when the host flagged it.
    /// A missing body reads as empty.
    pub fn text_body(&self) -> Result<String, base64::DecodeError> {
        let body = self.body.as_deref().unwrap_or_default();
        if self.is_base64_encoded {
            let bytes = BASE64.decode(body)?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        } else {
            Ok(body.to_string())
        }
    }
}

/// HTTP-shaped response returned to the host. `body` is always a JSON
/// document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub body: String,
}

impl ProxyResponse {
    /// Response whose body is `{"message": ...}`.
    pub fn message(status_code: u16, message: impl AsRef<str>) -> Self {
        Self {
            status_code,
            body: json!({ "message": message.as_ref() }).to_string(),
        }
    }

    pub fn document(document: &Document) -> Self {
        Self {
            status_code: 200,
            body: json!({
                "length": document.length,
                "type": document.content_type,
                "message": document.content,
            })
            .to_string(),
        }
    }

    pub fn unsupported_method() -> Self {
        Self::message(500, UNSUPPORTED_METHOD_MESSAGE)
    }

    pub fn not_found() -> Self {
        Self::message(404, NOT_FOUND_MESSAGE)
    }

    pub fn internal_error() -> Self {
        Self::message(500, INTERNAL_ERROR_MESSAGE)
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (
            status,
            [(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())],
            self.body,
        )
            .into_response()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DocError {
    #[error("object store request failed")]
    Store(#[from] StoreError),

    #[error("failed to read object body")]
    Drain(#[from] DrainError),

    #[error("document {0} does not exist")]
    DocumentMissing(DocumentLocation),

    #[error("request body is not valid base64")]
    InvalidBody(#[from] base64::DecodeError),
}

pub type DocResult<T> = std::result::Result<T, DocError>;
