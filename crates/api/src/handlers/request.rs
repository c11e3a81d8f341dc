use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use uuid::Uuid;

use shiftflow_core::errors::ScheduleError;
use shiftflow_core::models::event::{SyncEvent, SyncEventKind};
use shiftflow_core::models::request::{
    CreateRequestRequest, RequestStatus, RequestType, ShiftRequest,
};
use shiftflow_core::models::shift::Shift;
use shiftflow_db::repositories::assignment::{self, RegistrationMode};
use shiftflow_db::repositories::request as request_repo;

use crate::ApiState;
use crate::handlers::assignment::ensure_registrable;
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

async fn load_request(state: &ApiState, id: Uuid) -> Result<ShiftRequest, AppError> {
    let request = request_repo::get_request_by_id(&state.db_pool, id)
        .await
        .map_err(ScheduleError::Database)?
        .ok_or_else(|| ScheduleError::NotFound(format!("Request with ID {} not found", id)))?
        .into_core()
        .map_err(ScheduleError::Database)?;
    Ok(request)
}

async fn publish_request_event(
    state: &ApiState,
    kind: SyncEventKind,
    request: &ShiftRequest,
    shift: &Shift,
) {
    state
        .dispatcher
        .publish(SyncEvent::for_request(kind, request, shift))
        .await;
}

#[axum::debug_handler]
pub async fn create_request(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Json(payload): Json<CreateRequestRequest>,
) -> Result<Json<ShiftRequest>, AppError> {
    let shift = load_shift(&state, payload.shift_id).await?;

    // Per-type preconditions.
    let origin_assignment_id = match payload.request_type {
        RequestType::Leave => {
            let origin = assignment::find_active_for_staff(
                &state.db_pool,
                shift.id,
                actor.staff_id,
            )
            .await?
            .ok_or_else(|| {
                ScheduleError::Validation(format!(
                    "no active assignment on shift {} to leave",
                    shift.id
                ))
            })?;
            Some(origin.id)
        }
        RequestType::Swap => {
            let target_id = payload.target_user_id.ok_or_else(|| {
                ScheduleError::Validation("swap requests require a target_user_id".to_string())
            })?;
            if target_id == actor.staff_id {
                return Err(AppError(ScheduleError::Validation(
                    "cannot swap a shift with yourself".to_string(),
                )));
            }
            shiftflow_db::repositories::staff::get_staff_by_id(&state.db_pool, target_id)
                .await
                .map_err(ScheduleError::Database)?
                .filter(|s| s.is_active)
                .ok_or_else(|| {
                    ScheduleError::NotFound(format!("Staff profile {} not found", target_id))
                })?;

            let origin = assignment::find_active_for_staff(
                &state.db_pool,
                shift.id,
                actor.staff_id,
            )
            .await?
            .ok_or_else(|| {
                ScheduleError::Validation(format!(
                    "no active assignment on shift {} to swap",
                    shift.id
                ))
            })?;
            Some(origin.id)
        }
        RequestType::Overtime => {
            if payload.waived_rule.is_none() {
                return Err(AppError(ScheduleError::Validation(
                    "overtime requests must name the rule to waive".to_string(),
                )));
            }
            // The shift must still be joinable once the request is approved.
            ensure_registrable(&state, &shift, actor.staff_id).await?;
            None
        }
    };

    let duplicate = request_repo::has_open_request(
        &state.db_pool,
        shift.id,
        actor.staff_id,
        payload.request_type,
    )
    .await
    .map_err(ScheduleError::Database)?;
    if duplicate {
        return Err(AppError(ScheduleError::Validation(format!(
            "an open {} request for shift {} already exists",
            payload.request_type, shift.id
        ))));
    }

    let request = request_repo::create_request(
        &state.db_pool,
        &payload,
        actor.staff_id,
        origin_assignment_id,
    )
    .await
    .map_err(ScheduleError::Database)?
    .into_core()
    .map_err(ScheduleError::Database)?;

    publish_request_event(
        &state,
        SyncEventKind::request_created(request.request_type),
        &request,
        &shift,
    )
    .await;

    Ok(Json(request))
}

#[axum::debug_handler]
pub async fn get_request(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ShiftRequest>, AppError> {
    Ok(Json(load_request(&state, id).await?))
}

/// SWAP only: the named target accepts, moving the request to TARGET_RESPONDED so a
/// manager can approve it.
#[axum::debug_handler]
pub async fn target_respond(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ShiftRequest>, AppError> {
    let request = load_request(&state, id).await?;
    request.ensure_target_can_respond(actor.staff_id)?;

    let updated = request_repo::set_status(
        &state.db_pool,
        id,
        RequestStatus::Created,
        RequestStatus::TargetResponded,
    )
    .await
    .map_err(ScheduleError::Database)?
    .ok_or_else(|| ScheduleError::State(format!("request {} changed concurrently", id)))?
    .into_core()
    .map_err(ScheduleError::Database)?;

    let shift = load_shift(&state, updated.origin_shift_id).await?;
    publish_request_event(
        &state,
        SyncEventKind::ShiftRequestTargetResponded,
        &updated,
        &shift,
    )
    .await;

    Ok(Json(updated))
}

/// Manager approval, with the per-type side effect applied before the request flips
/// to APPROVED. A failing side effect leaves the request open.
#[axum::debug_handler]
pub async fn approve_request(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ShiftRequest>, AppError> {
    actor.ensure_manager()?;

    let request = load_request(&state, id).await?;
    request.ensure_approvable()?;
    let shift = load_shift(&state, request.origin_shift_id).await?;

    match request.request_type {
        RequestType::Leave => {
            let origin_id = request.origin_assignment_id.ok_or_else(|| {
                ScheduleError::State(format!("request {} has no origin assignment", id))
            })?;
            let cancelled = assignment::cancel_active(&state.db_pool, origin_id)
                .await?
                .ok_or_else(|| {
                    ScheduleError::State(format!(
                        "assignment {} is no longer active",
                        origin_id
                    ))
                })?
                .into_core()
                .map_err(ScheduleError::Database)?;
            state
                .dispatcher
                .publish(SyncEvent::for_assignment(
                    SyncEventKind::ShiftAssignmentDeleted,
                    &cancelled,
                    &shift,
                ))
                .await;
        }
        RequestType::Swap => {
            let origin_id = request.origin_assignment_id.ok_or_else(|| {
                ScheduleError::State(format!("request {} has no origin assignment", id))
            })?;
            let target_id = request.target_user_id.ok_or_else(|| {
                ScheduleError::State(format!("request {} has no swap target", id))
            })?;

            // The target joins the shift like any registrant: the shift must still
            // be published, unexpired, on an open date, and employment-compatible.
            ensure_registrable(&state, &shift, target_id).await?;

            let (cancelled, created) = assignment::swap_transfer(
                &state.db_pool,
                origin_id,
                target_id,
                &shift,
                &state.rules,
            )
            .await?;

            let cancelled = cancelled.into_core().map_err(ScheduleError::Database)?;
            let created = created.into_core().map_err(ScheduleError::Database)?;
            state
                .dispatcher
                .publish(SyncEvent::for_assignment(
                    SyncEventKind::ShiftAssignmentDeleted,
                    &cancelled,
                    &shift,
                ))
                .await;
            state
                .dispatcher
                .publish(SyncEvent::for_assignment(
                    SyncEventKind::ShiftAssignmentCreated,
                    &created,
                    &shift,
                ))
                .await;
        }
        RequestType::Overtime => {
            ensure_registrable(&state, &shift, request.requesting_user_id).await?;
            let created = assignment::register_validated(
                &state.db_pool,
                request.requesting_user_id,
                &shift,
                &state.rules,
                RegistrationMode::SanctionedOvertime,
                request.reason.as_deref(),
            )
            .await?
            .into_core()
            .map_err(ScheduleError::Database)?;
            state
                .dispatcher
                .publish(SyncEvent::for_assignment(
                    SyncEventKind::ShiftAssignmentCreated,
                    &created,
                    &shift,
                ))
                .await;
        }
    }

    let updated = request_repo::set_status(
        &state.db_pool,
        id,
        request.status,
        RequestStatus::Approved,
    )
    .await
    .map_err(ScheduleError::Database)?
    .ok_or_else(|| ScheduleError::State(format!("request {} changed concurrently", id)))?
    .into_core()
    .map_err(ScheduleError::Database)?;

    publish_request_event(&state, SyncEventKind::ShiftRequestApproved, &updated, &shift).await;

    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn reject_request(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ShiftRequest>, AppError> {
    actor.ensure_manager()?;

    let request = load_request(&state, id).await?;
    request.ensure_open()?;

    let updated = request_repo::set_status(
        &state.db_pool,
        id,
        request.status,
        RequestStatus::Rejected,
    )
    .await
    .map_err(ScheduleError::Database)?
    .ok_or_else(|| ScheduleError::State(format!("request {} changed concurrently", id)))?
    .into_core()
    .map_err(ScheduleError::Database)?;

    let shift = load_shift(&state, updated.origin_shift_id).await?;
    publish_request_event(&state, SyncEventKind::ShiftRequestRejected, &updated, &shift).await;

    Ok(Json(updated))
}

/// Requester withdraws their own open request. No assignment side effects.
#[axum::debug_handler]
pub async fn cancel_request(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ShiftRequest>, AppError> {
    let request = load_request(&state, id).await?;
    if request.requesting_user_id != actor.staff_id {
        return Err(AppError(ScheduleError::Forbidden(
            "only the requester may cancel a request".to_string(),
        )));
    }
    request.ensure_open()?;

    let updated = request_repo::set_status(
        &state.db_pool,
        id,
        request.status,
        RequestStatus::Cancelled,
    )
    .await
    .map_err(ScheduleError::Database)?
    .ok_or_else(|| ScheduleError::State(format!("request {} changed concurrently", id)))?
    .into_core()
    .map_err(ScheduleError::Database)?;

    let shift = load_shift(&state, updated.origin_shift_id).await?;
    publish_request_event(&state, SyncEventKind::ShiftRequestCancelled, &updated, &shift).await;

    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn my_requests(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
) -> Result<Json<Vec<ShiftRequest>>, AppError> {
    let rows = request_repo::list_for_staff(&state.db_pool, actor.staff_id)
        .await
        .map_err(ScheduleError::Database)?;
    let mut requests = Vec::with_capacity(rows.len());
    for row in rows {
        requests.push(row.into_core().map_err(ScheduleError::Database)?);
    }
    Ok(Json(requests))
}

#[derive(Debug, Deserialize)]
pub struct QueueQuery {
    pub branch_id: Uuid,
}

/// The manager's approval queue for one branch.
#[axum::debug_handler]
pub async fn open_requests(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Query(query): Query<QueueQuery>,
) -> Result<Json<Vec<ShiftRequest>>, AppError> {
    actor.ensure_manager()?;

    let rows = request_repo::list_open_for_branch(&state.db_pool, query.branch_id)
        .await
        .map_err(ScheduleError::Database)?;
    let mut requests = Vec::with_capacity(rows.len());
    for row in rows {
        requests.push(row.into_core().map_err(ScheduleError::Database)?);
    }
    Ok(Json(requests))
}
