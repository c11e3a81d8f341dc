use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ScheduleError, ScheduleResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Pending,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
    Rejected,
}

impl AssignmentStatus {
    /// Statuses that count toward shift capacity and time-conflict checks.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            AssignmentStatus::Pending
                | AssignmentStatus::Confirmed
                | AssignmentStatus::CheckedIn
                | AssignmentStatus::CheckedOut
        )
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssignmentStatus::Pending => "PENDING",
            AssignmentStatus::Confirmed => "CONFIRMED",
            AssignmentStatus::CheckedIn => "CHECKED_IN",
            AssignmentStatus::CheckedOut => "CHECKED_OUT",
            AssignmentStatus::Cancelled => "CANCELLED",
            AssignmentStatus::Rejected => "REJECTED",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(AssignmentStatus::Pending),
            "CONFIRMED" => Ok(AssignmentStatus::Confirmed),
            "CHECKED_IN" => Ok(AssignmentStatus::CheckedIn),
            "CHECKED_OUT" => Ok(AssignmentStatus::CheckedOut),
            "CANCELLED" => Ok(AssignmentStatus::Cancelled),
            "REJECTED" => Ok(AssignmentStatus::Rejected),
            _ => Err(format!("Unknown assignment status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentType {
    Regular,
    Overtime,
}

impl fmt::Display for AssignmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentType::Regular => write!(f, "REGULAR"),
            AssignmentType::Overtime => write!(f, "OVERTIME"),
        }
    }
}

impl FromStr for AssignmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REGULAR" => Ok(AssignmentType::Regular),
            "OVERTIME" => Ok(AssignmentType::Overtime),
            _ => Err(format!("Unknown assignment type: {}", s)),
        }
    }
}

/// Lifecycle actions on an assignment. Staff may only cancel while PENDING;
/// everything else is a manager action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentAction {
    Approve,
    Reject,
    CheckIn,
    CheckOut,
    Cancel,
}

impl AssignmentAction {
    /// The single legal transition table. Returns the next status or a STATE error,
    /// never mutating anything.
    pub fn apply(&self, current: AssignmentStatus) -> ScheduleResult<AssignmentStatus> {
        use AssignmentStatus::*;
        let next = match (self, current) {
            (AssignmentAction::Approve, Pending) => Confirmed,
            (AssignmentAction::Reject, Pending | Confirmed | CheckedIn) => Rejected,
            (AssignmentAction::CheckIn, Confirmed) => CheckedIn,
            (AssignmentAction::CheckOut, CheckedIn) => CheckedOut,
            (AssignmentAction::Cancel, Pending) => Cancelled,
            _ => {
                return Err(ScheduleError::State(format!(
                    "cannot {:?} an assignment in status {}",
                    self, current
                )));
            }
        };
        Ok(next)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftAssignment {
    pub id: Uuid,
    pub shift_id: Uuid,
    pub staff_user_id: Uuid,
    pub status: AssignmentStatus,
    pub assignment_type: AssignmentType,
    /// Set when an overtime approval waived the rest rule for this assignment's
    /// pairing with its neighbor.
    pub rest_waived: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub shift_id: Uuid,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectAssignmentRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchApproveRequest {
    pub assignment_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    pub assignment_id: Uuid,
    pub error: String,
}

/// Per-item outcomes: one id failing never aborts its siblings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchApproveResponse {
    pub approved: Vec<Uuid>,
    pub failed: Vec<BatchFailure>,
}
