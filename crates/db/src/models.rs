use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use shiftflow_core::models::assignment::{AssignmentStatus, AssignmentType, ShiftAssignment};
use shiftflow_core::models::closure::BranchClosure;
use shiftflow_core::models::request::{RequestStatus, RequestType, ShiftRequest};
use shiftflow_core::models::shift::{Shift, ShiftStatus};
use shiftflow_core::models::staff::StaffProfile;
use shiftflow_core::models::template::{EmploymentType, RoleRequirement, ShiftTemplate};
use shiftflow_core::rules::RuleKind;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbStaffProfile {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub display_name: String,
    pub employment_type: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl DbStaffProfile {
    pub fn into_core(self) -> Result<StaffProfile> {
        Ok(StaffProfile {
            id: self.id,
            branch_id: self.branch_id,
            display_name: self.display_name,
            employment_type: parse_employment(&self.employment_type)?,
            is_active: self.is_active,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbShiftTemplate {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_staff_allowed: Option<i32>,
    pub employment_type: String,
    pub role_requirements: Value,
    pub is_active: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbShiftTemplate {
    pub fn into_core(self) -> Result<ShiftTemplate> {
        Ok(ShiftTemplate {
            id: self.id,
            branch_id: self.branch_id,
            name: self.name,
            start_time: self.start_time,
            end_time: self.end_time,
            max_staff_allowed: self.max_staff_allowed,
            employment_type: parse_employment(&self.employment_type)?,
            role_requirements: parse_roles(self.role_requirements)?,
            is_active: self.is_active,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbShift {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub source_template_id: Option<Uuid>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_staff_allowed: Option<i32>,
    pub employment_type: String,
    pub role_requirements: Value,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbShift {
    pub fn into_core(self) -> Result<Shift> {
        Ok(Shift {
            id: self.id,
            branch_id: self.branch_id,
            source_template_id: self.source_template_id,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            max_staff_allowed: self.max_staff_allowed,
            employment_type: parse_employment(&self.employment_type)?,
            role_requirements: parse_roles(self.role_requirements)?,
            status: self
                .status
                .parse::<ShiftStatus>()
                .map_err(|e| eyre!(e))?,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insert payload for a shift row; the handler resolves template snapshots before
/// this reaches the repository.
#[derive(Debug, Clone)]
pub struct NewShift {
    pub branch_id: Uuid,
    pub source_template_id: Option<Uuid>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_staff_allowed: Option<i32>,
    pub employment_type: EmploymentType,
    pub role_requirements: Vec<RoleRequirement>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbShiftAssignment {
    pub id: Uuid,
    pub shift_id: Uuid,
    pub staff_user_id: Uuid,
    pub status: String,
    pub assignment_type: String,
    pub rest_waived: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbShiftAssignment {
    pub fn into_core(self) -> Result<ShiftAssignment> {
        Ok(ShiftAssignment {
            id: self.id,
            shift_id: self.shift_id,
            staff_user_id: self.staff_user_id,
            status: self
                .status
                .parse::<AssignmentStatus>()
                .map_err(|e| eyre!(e))?,
            assignment_type: self
                .assignment_type
                .parse::<AssignmentType>()
                .map_err(|e| eyre!(e))?,
            rest_waived: self.rest_waived,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// An assignment joined with its shift's window, for staff schedule views.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbStaffAssignmentRow {
    pub id: Uuid,
    pub shift_id: Uuid,
    pub staff_user_id: Uuid,
    pub status: String,
    pub assignment_type: String,
    pub rest_waived: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub branch_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbShiftRequest {
    pub id: Uuid,
    pub request_type: String,
    pub origin_shift_id: Uuid,
    pub origin_assignment_id: Option<Uuid>,
    pub target_user_id: Option<Uuid>,
    pub requesting_user_id: Uuid,
    pub status: String,
    pub waived_rule: Option<String>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbShiftRequest {
    pub fn into_core(self) -> Result<ShiftRequest> {
        Ok(ShiftRequest {
            id: self.id,
            request_type: self
                .request_type
                .parse::<RequestType>()
                .map_err(|e| eyre!(e))?,
            origin_shift_id: self.origin_shift_id,
            origin_assignment_id: self.origin_assignment_id,
            target_user_id: self.target_user_id,
            requesting_user_id: self.requesting_user_id,
            status: self
                .status
                .parse::<RequestStatus>()
                .map_err(|e| eyre!(e))?,
            waived_rule: self
                .waived_rule
                .map(|r| r.parse::<RuleKind>().map_err(|e| eyre!(e)))
                .transpose()?,
            reason: self.reason,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBranchClosure {
    pub id: Uuid,
    pub branch_id: Option<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DbBranchClosure {
    pub fn into_core(self) -> BranchClosure {
        BranchClosure {
            id: self.id,
            branch_id: self.branch_id,
            start_date: self.start_date,
            end_date: self.end_date,
            reason: self.reason,
            created_at: self.created_at,
        }
    }
}

fn parse_employment(s: &str) -> Result<EmploymentType> {
    s.parse::<EmploymentType>().map_err(|e| eyre!(e))
}

fn parse_roles(value: Value) -> Result<Vec<RoleRequirement>> {
    serde_json::from_value(value).map_err(|e| eyre!("invalid role_requirements payload: {e}"))
}
