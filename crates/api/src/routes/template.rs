use axum::{
    Router,
    routing::{delete, get, post, put},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/templates", post(handlers::template::create_template))
        .route("/api/templates", get(handlers::template::list_templates))
        .route("/api/templates/:id", get(handlers::template::get_template))
        .route("/api/templates/:id", put(handlers::template::update_template))
        .route(
            "/api/templates/:id",
            delete(handlers::template::deactivate_template),
        )
}
