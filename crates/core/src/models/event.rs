use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::assignment::{AssignmentType, ShiftAssignment};
use crate::models::request::{RequestType, ShiftRequest};
use crate::models::shift::Shift;

/// Every change event the dispatcher can publish. Clients treat any of these as a
/// hint to refetch the affected week, never as an authoritative delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncEventKind {
    ShiftDraftCreated,
    ShiftDraftUpdated,
    ShiftDraftDeleted,
    ShiftPublished,
    ShiftAssignmentCreated,
    ShiftAssignmentUpdated,
    ShiftAssignmentApproved,
    ShiftAssignmentRejected,
    ShiftAssignmentDeleted,
    ShiftAssignmentCheckedIn,
    ShiftAssignmentCheckedOut,
    ShiftRequestLeaveCreated,
    ShiftRequestSwapCreated,
    ShiftRequestOvertimeCreated,
    ShiftRequestApproved,
    ShiftRequestRejected,
    ShiftRequestCancelled,
    ShiftRequestTargetResponded,
}

impl SyncEventKind {
    pub fn request_created(request_type: RequestType) -> Self {
        match request_type {
            RequestType::Leave => SyncEventKind::ShiftRequestLeaveCreated,
            RequestType::Swap => SyncEventKind::ShiftRequestSwapCreated,
            RequestType::Overtime => SyncEventKind::ShiftRequestOvertimeCreated,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<Uuid>,
    pub shift_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_user_id: Option<Uuid>,
    pub shift_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_type: Option<AssignmentType>,
    pub branch_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncEvent {
    pub kind: SyncEventKind,
    pub metadata: EventMetadata,
}

impl SyncEvent {
    /// Event about a shift itself; no staff member is singled out.
    pub fn for_shift(kind: SyncEventKind, shift: &Shift) -> Self {
        SyncEvent {
            kind,
            metadata: EventMetadata {
                assignment_id: None,
                shift_id: shift.id,
                staff_user_id: None,
                shift_date: shift.date,
                start_time: shift.start_time,
                end_time: shift.end_time,
                status: Some(shift.status.to_string()),
                assignment_type: None,
                branch_id: shift.branch_id,
            },
        }
    }

    /// Event about one staff member's assignment on a shift; routed to the branch
    /// channel and the member's own channel.
    pub fn for_assignment(kind: SyncEventKind, assignment: &ShiftAssignment, shift: &Shift) -> Self {
        SyncEvent {
            kind,
            metadata: EventMetadata {
                assignment_id: Some(assignment.id),
                shift_id: shift.id,
                staff_user_id: Some(assignment.staff_user_id),
                shift_date: shift.date,
                start_time: shift.start_time,
                end_time: shift.end_time,
                status: Some(assignment.status.to_string()),
                assignment_type: Some(assignment.assignment_type),
                branch_id: shift.branch_id,
            },
        }
    }

    pub fn for_request(kind: SyncEventKind, request: &ShiftRequest, shift: &Shift) -> Self {
        SyncEvent {
            kind,
            metadata: EventMetadata {
                assignment_id: request.origin_assignment_id,
                shift_id: shift.id,
                staff_user_id: Some(request.requesting_user_id),
                shift_date: shift.date,
                start_time: shift.start_time,
                end_time: shift.end_time,
                status: Some(request.status.to_string()),
                assignment_type: None,
                branch_id: shift.branch_id,
            },
        }
    }
}
