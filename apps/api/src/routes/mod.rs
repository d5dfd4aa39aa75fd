pub mod health;
pub mod page;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/", get(page::index_handler))
        .route("/health", get(health::health_handler))
        .route("/api/v1/settings", get(handlers::handle_settings))
        .route("/api/v1/resume/extract", post(handlers::handle_extract))
        .route("/api/v1/analyze", post(handlers::handle_analyze))
        .layer(upload_limit)
        .with_state(state)
}
