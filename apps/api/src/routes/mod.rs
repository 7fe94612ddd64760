pub mod health;
pub mod ui;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::batch::handlers as batch_handlers;
use crate::presenter::handlers as results_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(ui::index_handler))
        .route("/health", get(health::health_handler))
        // Batch API
        .route("/api/v1/batches", post(batch_handlers::handle_create_batch))
        .route(
            "/api/v1/batches/progress",
            get(batch_handlers::handle_get_progress),
        )
        // Results API
        .route("/api/v1/results", get(results_handlers::handle_get_results))
        .route(
            "/api/v1/results/csv",
            get(results_handlers::handle_download_csv),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
