pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::plagiarism::handlers as plagiarism;
use crate::state::AppState;
use crate::submissions::handlers as submissions;

/// Uploads above this size are refused before reaching the handler.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/submissions",
            post(submissions::handle_submit).get(submissions::handle_list_submissions),
        )
        .route("/api/v1/plagiarism/roster", get(plagiarism::handle_roster))
        .route("/api/v1/plagiarism/check", post(plagiarism::handle_check))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
