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
use shiftflow_core::models::assignment::{
    AssignmentAction, BatchApproveRequest, BatchApproveResponse, BatchFailure,
    RegisterRequest, RejectAssignmentRequest, ShiftAssignment,
};
use shiftflow_core::models::closure::BranchClosureGate;
use shiftflow_core::models::event::{SyncEvent, SyncEventKind};
use shiftflow_core::models::shift::Shift;
use shiftflow_db::repositories::assignment::{self, RegistrationMode};

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

async fn load_assignment(state: &ApiState, id: Uuid) -> Result<ShiftAssignment, AppError> {
    let assignment = assignment::get_assignment_by_id(&state.db_pool, id)
        .await?
        .ok_or_else(|| ScheduleError::NotFound(format!("Assignment with ID {} not found", id)))?
        .into_core()
        .map_err(ScheduleError::Database)?;
    Ok(assignment)
}

/// Gathers the facts the pure registration gates need (closure calendar, the
/// staff member's profile) and runs them. Shared by self-registration and the
/// exception-request paths that create assignments on approval.
pub(crate) async fn ensure_registrable(
    state: &ApiState,
    shift: &Shift,
    staff_user_id: Uuid,
) -> Result<(), AppError> {
    let branch_closed = state
        .closure_gate
        .is_closed(shift.branch_id, shift.date)
        .await?;
    let caller = shiftflow_db::repositories::staff::get_staff_by_id(&state.db_pool, staff_user_id)
        .await
        .map_err(ScheduleError::Database)?
        .ok_or_else(|| {
            ScheduleError::NotFound(format!("Staff profile {} not found", staff_user_id))
        })?
        .into_core()
        .map_err(ScheduleError::Database)?;

    availability::ensure_registrable(shift, Utc::now().naive_utc(), branch_closed, &caller)?;
    Ok(())
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ShiftAssignment>, AppError> {
    let shift = load_shift(&state, payload.shift_id).await?;
    ensure_registrable(&state, &shift, actor.staff_id).await?;

    let db_assignment = assignment::register_validated(
        &state.db_pool,
        actor.staff_id,
        &shift,
        &state.rules,
        RegistrationMode::Regular,
        payload.notes.as_deref(),
    )
    .await?;

    let created = db_assignment.into_core().map_err(ScheduleError::Database)?;
    state
        .dispatcher
        .publish(SyncEvent::for_assignment(
            SyncEventKind::ShiftAssignmentCreated,
            &created,
            &shift,
        ))
        .await;

    Ok(Json(created))
}

async fn apply_transition(
    state: &ApiState,
    id: Uuid,
    action: AssignmentAction,
    note: Option<&str>,
    event_kind: SyncEventKind,
) -> Result<ShiftAssignment, AppError> {
    let updated = assignment::transition(&state.db_pool, id, action, note)
        .await?
        .into_core()
        .map_err(ScheduleError::Database)?;

    let shift = load_shift(state, updated.shift_id).await?;
    state
        .dispatcher
        .publish(SyncEvent::for_assignment(event_kind, &updated, &shift))
        .await;

    Ok(updated)
}

#[axum::debug_handler]
pub async fn approve(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ShiftAssignment>, AppError> {
    actor.ensure_manager()?;
    let updated = apply_transition(
        &state,
        id,
        AssignmentAction::Approve,
        None,
        SyncEventKind::ShiftAssignmentApproved,
    )
    .await?;
    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn reject(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectAssignmentRequest>,
) -> Result<Json<ShiftAssignment>, AppError> {
    actor.ensure_manager()?;
    let updated = apply_transition(
        &state,
        id,
        AssignmentAction::Reject,
        Some(&payload.reason),
        SyncEventKind::ShiftAssignmentRejected,
    )
    .await?;
    Ok(Json(updated))
}

/// Attendance is recorded by the manager on site, like approve/reject; staff
/// themselves only ever cancel.
#[axum::debug_handler]
pub async fn check_in(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ShiftAssignment>, AppError> {
    actor.ensure_manager()?;
    let updated = apply_transition(
        &state,
        id,
        AssignmentAction::CheckIn,
        None,
        SyncEventKind::ShiftAssignmentCheckedIn,
    )
    .await?;
    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn check_out(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ShiftAssignment>, AppError> {
    actor.ensure_manager()?;
    let updated = apply_transition(
        &state,
        id,
        AssignmentAction::CheckOut,
        None,
        SyncEventKind::ShiftAssignmentCheckedOut,
    )
    .await?;
    Ok(Json(updated))
}

/// Staff cancel their own PENDING assignment; any other status fails STATE with the
/// record untouched.
#[axum::debug_handler]
pub async fn cancel(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ShiftAssignment>, AppError> {
    let current = load_assignment(&state, id).await?;
    if current.staff_user_id != actor.staff_id {
        return Err(AppError(ScheduleError::Forbidden(
            "cannot cancel another staff member's assignment".to_string(),
        )));
    }
    let updated = apply_transition(
        &state,
        id,
        AssignmentAction::Cancel,
        None,
        SyncEventKind::ShiftAssignmentDeleted,
    )
    .await?;
    Ok(Json(updated))
}

/// Runs one fallible approval per id; failures are collected, never aborting
/// siblings.
async fn approve_each<F, Fut>(ids: Vec<Uuid>, mut approve_one: F) -> BatchApproveResponse
where
    F: FnMut(Uuid) -> Fut,
    Fut: std::future::Future<Output = Result<ShiftAssignment, AppError>>,
{
    let mut approved = Vec::new();
    let mut failed = Vec::new();
    for id in ids {
        match approve_one(id).await {
            Ok(_) => approved.push(id),
            Err(AppError(err)) => failed.push(BatchFailure {
                assignment_id: id,
                error: err.to_string(),
            }),
        }
    }
    BatchApproveResponse { approved, failed }
}

#[axum::debug_handler]
pub async fn batch_approve(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Json(payload): Json<BatchApproveRequest>,
) -> Result<Json<BatchApproveResponse>, AppError> {
    actor.ensure_manager()?;

    let response = approve_each(payload.assignment_ids, |id| {
        apply_transition(
            &state,
            id,
            AssignmentAction::Approve,
            None,
            SyncEventKind::ShiftAssignmentApproved,
        )
    })
    .await;

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn list_for_shift(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Path(shift_id): Path<Uuid>,
) -> Result<Json<Vec<ShiftAssignment>>, AppError> {
    actor.ensure_manager()?;

    load_shift(&state, shift_id).await?;

    let rows = assignment::list_for_shift(&state.db_pool, shift_id).await?;
    let mut assignments = Vec::with_capacity(rows.len());
    for row in rows {
        assignments.push(row.into_core().map_err(ScheduleError::Database)?);
    }
    Ok(Json(assignments))
}

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// The calling staff member's own schedule, assignments joined with shift windows.
#[axum::debug_handler]
pub async fn my_schedule(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<Vec<shiftflow_db::models::DbStaffAssignmentRow>>, AppError> {
    let rows = assignment::list_for_staff_range(
        &state.db_pool,
        actor.staff_id,
        query.start_date,
        query.end_date,
    )
    .await?;
    Ok(Json(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shiftflow_core::models::assignment::{AssignmentStatus, AssignmentType};

    fn confirmed(id: Uuid) -> ShiftAssignment {
        let now = Utc::now();
        ShiftAssignment {
            id,
            shift_id: Uuid::new_v4(),
            staff_user_id: Uuid::new_v4(),
            status: AssignmentStatus::Confirmed,
            assignment_type: AssignmentType::Regular,
            rest_waived: false,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn failing_item_never_aborts_its_siblings() {
        let ok1 = Uuid::new_v4();
        let bad = Uuid::new_v4();
        let ok2 = Uuid::new_v4();

        let response = approve_each(vec![ok1, bad, ok2], |id| async move {
            if id == bad {
                Err(AppError(ScheduleError::State(format!(
                    "cannot Approve a CANCELLED assignment ({id})"
                ))))
            } else {
                Ok(confirmed(id))
            }
        })
        .await;

        assert_eq!(response.approved, vec![ok1, ok2]);
        assert_eq!(response.failed.len(), 1);
        assert_eq!(response.failed[0].assignment_id, bad);
        assert!(response.failed[0].error.contains("CANCELLED"));
    }

    #[tokio::test]
    async fn all_good_batch_reports_no_failures() {
        let ids = vec![Uuid::new_v4(), Uuid::new_v4()];
        let response = approve_each(ids.clone(), |id| async move { Ok(confirmed(id)) }).await;

        assert_eq!(response.approved, ids);
        assert!(response.failed.is_empty());
    }
}
