use axum::{
    Router,
    routing::{get, put},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/staff", put(handlers::staff::upsert_staff))
        .route("/api/staff", get(handlers::staff::list_staff))
}
