use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ScheduleError, ScheduleResult};
use crate::rules::RuleKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestType {
    Leave,
    Swap,
    Overtime,
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestType::Leave => write!(f, "LEAVE"),
            RequestType::Swap => write!(f, "SWAP"),
            RequestType::Overtime => write!(f, "OVERTIME"),
        }
    }
}

impl FromStr for RequestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LEAVE" => Ok(RequestType::Leave),
            "SWAP" => Ok(RequestType::Swap),
            "OVERTIME" => Ok(RequestType::Overtime),
            _ => Err(format!("Unknown request type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Created,
    TargetResponded,
    Approved,
    Rejected,
    Cancelled,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestStatus::Created => "CREATED",
            RequestStatus::TargetResponded => "TARGET_RESPONDED",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(RequestStatus::Created),
            "TARGET_RESPONDED" => Ok(RequestStatus::TargetResponded),
            "APPROVED" => Ok(RequestStatus::Approved),
            "REJECTED" => Ok(RequestStatus::Rejected),
            "CANCELLED" => Ok(RequestStatus::Cancelled),
            _ => Err(format!("Unknown request status: {}", s)),
        }
    }
}

/// A staff-initiated exception request: leave a shift, swap it to a colleague, or
/// work it as overtime past a soft labor-law limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftRequest {
    pub id: Uuid,
    pub request_type: RequestType,
    pub origin_shift_id: Uuid,
    pub origin_assignment_id: Option<Uuid>,
    pub target_user_id: Option<Uuid>,
    pub requesting_user_id: Uuid,
    pub status: RequestStatus,
    /// The soft rule an OVERTIME approval will waive when replaying registration.
    pub waived_rule: Option<RuleKind>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShiftRequest {
    /// SWAP needs the target's response before a manager may approve; everything
    /// else approves straight from CREATED.
    pub fn ensure_approvable(&self) -> ScheduleResult<()> {
        let ok = match self.request_type {
            RequestType::Swap => self.status == RequestStatus::TargetResponded,
            _ => self.status == RequestStatus::Created,
        };
        if !ok {
            return Err(ScheduleError::State(format!(
                "{} request {} is {}, cannot approve",
                self.request_type, self.id, self.status
            )));
        }
        Ok(())
    }

    pub fn ensure_open(&self) -> ScheduleResult<()> {
        if !matches!(
            self.status,
            RequestStatus::Created | RequestStatus::TargetResponded
        ) {
            return Err(ScheduleError::State(format!(
                "request {} is already {}",
                self.id, self.status
            )));
        }
        Ok(())
    }

    pub fn ensure_target_can_respond(&self, responder: Uuid) -> ScheduleResult<()> {
        if self.request_type != RequestType::Swap {
            return Err(ScheduleError::State(format!(
                "{} requests take no target response",
                self.request_type
            )));
        }
        if self.status != RequestStatus::Created {
            return Err(ScheduleError::State(format!(
                "request {} is {}, target already responded or request closed",
                self.id, self.status
            )));
        }
        if self.target_user_id != Some(responder) {
            return Err(ScheduleError::Forbidden(format!(
                "user {} is not the swap target of request {}",
                responder, self.id
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequestRequest {
    pub request_type: RequestType,
    pub shift_id: Uuid,
    pub target_user_id: Option<Uuid>,
    /// For OVERTIME: the soft violation the registration attempt surfaced.
    pub waived_rule: Option<RuleKind>,
    pub reason: Option<String>,
}
