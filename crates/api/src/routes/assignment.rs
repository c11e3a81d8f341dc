use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/assignments", post(handlers::assignment::register))
        .route("/api/assignments/mine", get(handlers::assignment::my_schedule))
        .route(
            "/api/assignments/batch-approve",
            post(handlers::assignment::batch_approve),
        )
        .route("/api/assignments/:id/approve", post(handlers::assignment::approve))
        .route("/api/assignments/:id/reject", post(handlers::assignment::reject))
        .route("/api/assignments/:id/check-in", post(handlers::assignment::check_in))
        .route("/api/assignments/:id/check-out", post(handlers::assignment::check_out))
        .route("/api/assignments/:id/cancel", post(handlers::assignment::cancel))
}
