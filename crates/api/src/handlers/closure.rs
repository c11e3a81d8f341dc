use axum::{
    Json,
    extract::{Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use shiftflow_core::errors::ScheduleError;
use shiftflow_core::models::closure::{BranchClosure, CreateClosureRequest};

use crate::ApiState;
use crate::middleware::{actor::Actor, error_handling::AppError};

#[axum::debug_handler]
pub async fn create_closure(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Json(payload): Json<CreateClosureRequest>,
) -> Result<Json<BranchClosure>, AppError> {
    actor.ensure_manager()?;

    if payload.start_date > payload.end_date {
        return Err(AppError(ScheduleError::Validation(
            "start_date must not be after end_date".to_string(),
        )));
    }

    let closure = shiftflow_db::repositories::closure::create_closure(
        &state.db_pool,
        payload.branch_id,
        payload.start_date,
        payload.end_date,
        payload.reason.as_deref(),
    )
    .await
    .map_err(ScheduleError::Database)?
    .into_core();

    Ok(Json(closure))
}

#[derive(Debug, Deserialize)]
pub struct ListClosuresQuery {
    pub branch_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Closures affecting one branch in a date range, global ones included.
#[axum::debug_handler]
pub async fn list_closures(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ListClosuresQuery>,
) -> Result<Json<Vec<BranchClosure>>, AppError> {
    let rows = shiftflow_db::repositories::closure::list_closures(
        &state.db_pool,
        query.branch_id,
        query.start_date,
        query.end_date,
    )
    .await
    .map_err(ScheduleError::Database)?;

    Ok(Json(rows.into_iter().map(|row| row.into_core()).collect()))
}
