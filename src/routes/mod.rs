//! HTTP Routes
//!
//! Local host for the function. Every request is turned into a
//! [`ProxyEvent`](crate::types::ProxyEvent) and answered by the same handler
//! the Lambda entry point uses:
//! - `GET /api/health` - Health check
//! - anything else, including other methods on `/api/health` - Document
//!   function (GET reads, POST appends)

pub mod documents;
pub mod health;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::models::AppState;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    Router::new()
        .merge(health::router())
        .merge(documents::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
