use axum::{routing::get, Json, Router};

use crate::models::AppState;
use crate::routes::documents::proxy_request;
use crate::types::HealthResponse;

/// Only `GET` is the health check; other methods on the path still reach
/// the document function.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health_check).fallback(proxy_request))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
