use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/closures", post(handlers::closure::create_closure))
        .route("/api/closures", get(handlers::closure::list_closures))
}
