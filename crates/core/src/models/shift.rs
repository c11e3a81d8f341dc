use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ScheduleError, ScheduleResult};
use crate::models::template::{EmploymentType, RoleRequirement};
use crate::rules::ShiftWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftStatus {
    Draft,
    Published,
}

impl fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftStatus::Draft => write!(f, "DRAFT"),
            ShiftStatus::Published => write!(f, "PUBLISHED"),
        }
    }
}

impl FromStr for ShiftStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(ShiftStatus::Draft),
            "PUBLISHED" => Ok(ShiftStatus::Published),
            _ => Err(format!("Unknown shift status: {}", s)),
        }
    }
}

/// A concrete dated shift instance. Role requirements are snapshotted from the source
/// template at creation and evolve independently afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub source_template_id: Option<Uuid>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_staff_allowed: Option<i32>,
    pub employment_type: EmploymentType,
    pub role_requirements: Vec<RoleRequirement>,
    pub status: ShiftStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shift {
    pub fn window(&self) -> ShiftWindow {
        ShiftWindow::new(self.date, self.start_time, self.end_time)
    }

    pub fn is_expired(&self, now: chrono::NaiveDateTime) -> bool {
        self.date.and_time(self.end_time) <= now
    }

    /// Guards the published-shift immutability invariant: once PUBLISHED only
    /// capacity and notes may change.
    pub fn ensure_draft(&self) -> ScheduleResult<()> {
        if self.status != ShiftStatus::Draft {
            return Err(ScheduleError::State(format!(
                "shift {} is {}, expected DRAFT",
                self.id, self.status
            )));
        }
        Ok(())
    }
}

/// Draft creation: either instantiate a template on a date, or fully ad hoc.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDraftRequest {
    pub branch_id: Uuid,
    pub date: NaiveDate,
    pub template_id: Option<Uuid>,
    /// Required when no template is given; ignored otherwise.
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub max_staff_allowed: Option<i32>,
    pub employment_type: Option<EmploymentType>,
    #[serde(default)]
    pub role_requirements: Vec<RoleRequirement>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDraftRequest {
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub max_staff_allowed: Option<Option<i32>>,
    pub employment_type: Option<EmploymentType>,
    pub role_requirements: Option<Vec<RoleRequirement>>,
    pub notes: Option<String>,
}

/// The only fields a PUBLISHED shift accepts changes to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePublishedRequest {
    pub max_staff_allowed: Option<Option<i32>>,
    pub notes: Option<String>,
}

/// A shift annotated for one specific caller by `get_available_shifts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableShift {
    #[serde(flatten)]
    pub shift: Shift,
    pub registered_count: i64,
    pub is_expired: bool,
    pub is_full: bool,
    pub is_registered: bool,
    pub is_available: bool,
}
