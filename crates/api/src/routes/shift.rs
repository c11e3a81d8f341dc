use axum::{
    Router,
    routing::{delete, get, post, put},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/shifts", post(handlers::shift::create_draft))
        .route("/api/shifts", get(handlers::shift::list_shifts))
        .route("/api/shifts/available", get(handlers::shift::get_available_shifts))
        .route("/api/shifts/:id", get(handlers::shift::get_shift))
        .route("/api/shifts/:id", put(handlers::shift::update_draft))
        .route("/api/shifts/:id", delete(handlers::shift::delete_draft))
        .route("/api/shifts/:id/publish", post(handlers::shift::publish_shift))
        .route(
            "/api/shifts/:id/published",
            put(handlers::shift::update_published),
        )
        .route(
            "/api/shifts/:id/assignments",
            get(handlers::assignment::list_for_shift),
        )
}
