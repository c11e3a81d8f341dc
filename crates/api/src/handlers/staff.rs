use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use shiftflow_core::errors::ScheduleError;
use shiftflow_core::models::staff::{StaffProfile, UpsertStaffRequest};

use crate::ApiState;
use crate::middleware::{actor::Actor, error_handling::AppError};

/// Staff identity lives upstream; this endpoint keeps the local mirror current.
#[axum::debug_handler]
pub async fn upsert_staff(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Json(payload): Json<UpsertStaffRequest>,
) -> Result<Json<StaffProfile>, AppError> {
    actor.ensure_manager()?;

    if payload.display_name.trim().is_empty() {
        return Err(AppError(ScheduleError::Validation(
            "display_name must not be empty".to_string(),
        )));
    }

    let staff = shiftflow_db::repositories::staff::upsert_staff(
        &state.db_pool,
        payload.id,
        payload.branch_id,
        &payload.display_name,
        payload.employment_type,
        payload.is_active,
    )
    .await
    .map_err(ScheduleError::Database)?
    .into_core()
    .map_err(ScheduleError::Database)?;

    Ok(Json(staff))
}

#[derive(Debug, Deserialize)]
pub struct RosterQuery {
    pub branch_id: Uuid,
}

/// Active roster for a branch, e.g. for picking a swap target.
#[axum::debug_handler]
pub async fn list_staff(
    State(state): State<Arc<ApiState>>,
    _actor: Actor,
    Query(query): Query<RosterQuery>,
) -> Result<Json<Vec<StaffProfile>>, AppError> {
    let rows = shiftflow_db::repositories::staff::list_staff(&state.db_pool, query.branch_id)
        .await
        .map_err(ScheduleError::Database)?;

    let mut roster = Vec::with_capacity(rows.len());
    for row in rows {
        roster.push(row.into_core().map_err(ScheduleError::Database)?);
    }
    Ok(Json(roster))
}
