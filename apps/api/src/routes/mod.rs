pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::submission::handlers;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/submit-form", post(handlers::handle_submit))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
