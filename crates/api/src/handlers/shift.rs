use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use shiftflow_core::availability;
use shiftflow_core::errors::ScheduleError;
use shiftflow_core::models::closure::BranchClosureGate;
use shiftflow_core::models::event::{SyncEvent, SyncEventKind};
use shiftflow_core::models::shift::{
    AvailableShift, CreateDraftRequest, Shift, ShiftStatus, UpdateDraftRequest,
    UpdatePublishedRequest,
};
use shiftflow_core::models::template::check_role_requirements;
use shiftflow_db::models::NewShift;

use crate::ApiState;
use crate::middleware::{actor::Actor, error_handling::AppError};

async fn load_shift(state: &ApiState, id: Uuid) -> Result<Shift, AppError> {
    let shift = shiftflow_db::repositories::shift::get_shift_by_id(&state.db_pool, id)
        .await
        .map_err(ScheduleError::Database)?
        .ok_or_else(|| ScheduleError::NotFound(format!("Shift with ID {} not found", id)))?
        .into_core()
        .map_err(ScheduleError::Database)?;
    Ok(shift)
}

#[axum::debug_handler]
pub async fn create_draft(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Json(payload): Json<CreateDraftRequest>,
) -> Result<Json<Shift>, AppError> {
    actor.ensure_manager()?;

    // Template instantiation snapshots the template onto the dated shift; the copy
    // evolves independently from here on.
    let new = match payload.template_id {
        Some(template_id) => {
            let template = shiftflow_db::repositories::template::get_template_by_id(
                &state.db_pool,
                template_id,
            )
            .await
            .map_err(ScheduleError::Database)?
            .ok_or_else(|| {
                ScheduleError::NotFound(format!("Template with ID {} not found", template_id))
            })?
            .into_core()
            .map_err(ScheduleError::Database)?;

            if !template.is_active {
                return Err(AppError(ScheduleError::Validation(format!(
                    "template {} is deactivated",
                    template_id
                ))));
            }
            if template.branch_id != payload.branch_id {
                return Err(AppError(ScheduleError::Validation(format!(
                    "template {} belongs to another branch",
                    template_id
                ))));
            }

            NewShift {
                branch_id: payload.branch_id,
                source_template_id: Some(template_id),
                date: payload.date,
                start_time: template.start_time,
                end_time: template.end_time,
                max_staff_allowed: template.max_staff_allowed,
                employment_type: template.employment_type,
                role_requirements: template.role_requirements,
                notes: payload.notes,
            }
        }
        None => {
            let (Some(start_time), Some(end_time)) = (payload.start_time, payload.end_time) else {
                return Err(AppError(ScheduleError::Validation(
                    "ad-hoc drafts require start_time and end_time".to_string(),
                )));
            };
            if start_time >= end_time {
                return Err(AppError(ScheduleError::Validation(
                    "start_time must be before end_time".to_string(),
                )));
            }
            check_role_requirements(&payload.role_requirements, payload.max_staff_allowed)?;

            NewShift {
                branch_id: payload.branch_id,
                source_template_id: None,
                date: payload.date,
                start_time,
                end_time,
                max_staff_allowed: payload.max_staff_allowed,
                employment_type: payload
                    .employment_type
                    .unwrap_or(shiftflow_core::models::template::EmploymentType::Any),
                role_requirements: payload.role_requirements,
                notes: payload.notes,
            }
        }
    };

    let shift = shiftflow_db::repositories::shift::create_draft(&state.db_pool, &new)
        .await
        .map_err(ScheduleError::Database)?
        .into_core()
        .map_err(ScheduleError::Database)?;

    state
        .dispatcher
        .publish(SyncEvent::for_shift(SyncEventKind::ShiftDraftCreated, &shift))
        .await;

    Ok(Json(shift))
}

#[axum::debug_handler]
pub async fn get_shift(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Shift>, AppError> {
    Ok(Json(load_shift(&state, id).await?))
}

#[axum::debug_handler]
pub async fn update_draft(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDraftRequest>,
) -> Result<Json<Shift>, AppError> {
    actor.ensure_manager()?;

    let current = load_shift(&state, id).await?;
    current.ensure_draft()?;

    let start = payload.start_time.unwrap_or(current.start_time);
    let end = payload.end_time.unwrap_or(current.end_time);
    if start >= end {
        return Err(AppError(ScheduleError::Validation(
            "start_time must be before end_time".to_string(),
        )));
    }
    let cap = payload.max_staff_allowed.unwrap_or(current.max_staff_allowed);
    let roles = payload
        .role_requirements
        .as_deref()
        .unwrap_or(&current.role_requirements);
    check_role_requirements(roles, cap)?;

    // The repository re-checks DRAFT under the update, so a publish racing this
    // call loses cleanly.
    let shift = shiftflow_db::repositories::shift::update_draft(&state.db_pool, id, &payload)
        .await
        .map_err(ScheduleError::Database)?
        .ok_or_else(|| {
            ScheduleError::State(format!("shift {} is no longer DRAFT", id))
        })?
        .into_core()
        .map_err(ScheduleError::Database)?;

    state
        .dispatcher
        .publish(SyncEvent::for_shift(SyncEventKind::ShiftDraftUpdated, &shift))
        .await;

    Ok(Json(shift))
}

#[axum::debug_handler]
pub async fn publish_shift(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Shift>, AppError> {
    actor.ensure_manager()?;

    let current = load_shift(&state, id).await?;
    current.ensure_draft()?;

    let shift = shiftflow_db::repositories::shift::publish_shift(&state.db_pool, id)
        .await
        .map_err(ScheduleError::Database)?
        .ok_or_else(|| ScheduleError::State(format!("shift {} is no longer DRAFT", id)))?
        .into_core()
        .map_err(ScheduleError::Database)?;

    state
        .dispatcher
        .publish(SyncEvent::for_shift(SyncEventKind::ShiftPublished, &shift))
        .await;

    Ok(Json(shift))
}

#[axum::debug_handler]
pub async fn delete_draft(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    actor.ensure_manager()?;

    let current = load_shift(&state, id).await?;
    current.ensure_draft()?;

    let deleted = shiftflow_db::repositories::shift::delete_draft(&state.db_pool, id)
        .await
        .map_err(ScheduleError::Database)?;
    if !deleted {
        return Err(AppError(ScheduleError::State(format!(
            "shift {} is no longer DRAFT",
            id
        ))));
    }

    state
        .dispatcher
        .publish(SyncEvent::for_shift(SyncEventKind::ShiftDraftDeleted, &current))
        .await;

    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[axum::debug_handler]
pub async fn update_published(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePublishedRequest>,
) -> Result<Json<Shift>, AppError> {
    actor.ensure_manager()?;

    let current = load_shift(&state, id).await?;
    if current.status != ShiftStatus::Published {
        return Err(AppError(ScheduleError::State(format!(
            "shift {} is {}, expected PUBLISHED",
            id, current.status
        ))));
    }

    let shift = shiftflow_db::repositories::shift::update_published(&state.db_pool, id, &payload)
        .await
        .map_err(ScheduleError::Database)?
        .ok_or_else(|| ScheduleError::State(format!("shift {} is no longer PUBLISHED", id)))?
        .into_core()
        .map_err(ScheduleError::Database)?;

    // Re-announce so connected clients refetch the changed capacity.
    state
        .dispatcher
        .publish(SyncEvent::for_shift(SyncEventKind::ShiftPublished, &shift))
        .await;

    Ok(Json(shift))
}

#[derive(Debug, Deserialize)]
pub struct ListShiftsQuery {
    pub branch_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub published_only: bool,
}

/// The manager's planning view: every shift in the range, drafts included unless
/// `published_only` is set.
#[axum::debug_handler]
pub async fn list_shifts(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Query(query): Query<ListShiftsQuery>,
) -> Result<Json<Vec<Shift>>, AppError> {
    actor.ensure_manager()?;

    let db_shifts = shiftflow_db::repositories::shift::list_shifts(
        &state.db_pool,
        query.branch_id,
        query.start_date,
        query.end_date,
        query.published_only,
    )
    .await
    .map_err(ScheduleError::Database)?;

    let mut shifts = Vec::with_capacity(db_shifts.len());
    for db_shift in db_shifts {
        shifts.push(db_shift.into_core().map_err(ScheduleError::Database)?);
    }
    Ok(Json(shifts))
}

#[derive(Debug, Deserialize)]
pub struct AvailableShiftsQuery {
    pub branch_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Published shifts in the range, each annotated for the calling staff member.
#[axum::debug_handler]
pub async fn get_available_shifts(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Query(query): Query<AvailableShiftsQuery>,
) -> Result<Json<Vec<AvailableShift>>, AppError> {
    let caller = shiftflow_db::repositories::staff::get_staff_by_id(&state.db_pool, actor.staff_id)
        .await
        .map_err(ScheduleError::Database)?
        .ok_or_else(|| {
            ScheduleError::NotFound(format!("Staff profile {} not found", actor.staff_id))
        })?
        .into_core()
        .map_err(ScheduleError::Database)?;

    let db_shifts = shiftflow_db::repositories::shift::list_shifts(
        &state.db_pool,
        query.branch_id,
        query.start_date,
        query.end_date,
        true,
    )
    .await
    .map_err(ScheduleError::Database)?;

    let now = Utc::now().naive_utc();
    let mut closed_cache: HashMap<NaiveDate, bool> = HashMap::new();
    let mut annotated = Vec::with_capacity(db_shifts.len());

    for db_shift in db_shifts {
        let shift = db_shift.into_core().map_err(ScheduleError::Database)?;

        let active_count =
            shiftflow_db::repositories::shift::count_active_assignments(&state.db_pool, shift.id)
                .await
                .map_err(ScheduleError::Database)?;
        let caller_registered = shiftflow_db::repositories::shift::staff_has_active_assignment(
            &state.db_pool,
            shift.id,
            actor.staff_id,
        )
        .await
        .map_err(ScheduleError::Database)?;

        let branch_closed = match closed_cache.get(&shift.date) {
            Some(closed) => *closed,
            None => {
                let closed = state.closure_gate.is_closed(shift.branch_id, shift.date).await?;
                closed_cache.insert(shift.date, closed);
                closed
            }
        };

        annotated.push(availability::annotate(
            shift,
            now,
            active_count,
            &caller,
            caller_registered,
            branch_closed,
        ));
    }

    Ok(Json(annotated))
}
