// Doc Store - serverless function over a single append-only text document

pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod storage;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use handlers::handle_event;
pub use models::AppState;
pub use types::{ProxyEvent, ProxyResponse};

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
