pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::resume::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/resume/formats", get(handlers::handle_formats))
        .route("/api/v1/resume/ingest", post(handlers::handle_ingest))
        .route("/api/v1/resume/parse", post(handlers::handle_parse))
        .route("/api/v1/resume", post(handlers::handle_upload_and_parse))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
