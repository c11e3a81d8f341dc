use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/requests", post(handlers::request::create_request))
        .route("/api/requests/mine", get(handlers::request::my_requests))
        .route("/api/requests/open", get(handlers::request::open_requests))
        .route("/api/requests/:id", get(handlers::request::get_request))
        .route("/api/requests/:id/respond", post(handlers::request::target_respond))
        .route("/api/requests/:id/approve", post(handlers::request::approve_request))
        .route("/api/requests/:id/reject", post(handlers::request::reject_request))
        .route("/api/requests/:id/cancel", post(handlers::request::cancel_request))
}
