pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Upload form used by the dashboard
        .route(
            "/evaluate_resume_with_jd/",
            post(handlers::handle_evaluate_upload),
        )
        .route(
            "/evaluate_resume_with_jd",
            post(handlers::handle_evaluate_upload),
        )
        .route("/api/v1/evaluate", post(handlers::handle_evaluate_text))
        .route(
            "/api/v1/evaluate/bulk",
            post(handlers::handle_evaluate_bulk),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
