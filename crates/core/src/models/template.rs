use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ScheduleError, ScheduleResult};

/// Employment-type filter on templates and shifts. `Any` matches every profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Casual,
    Any,
}

impl EmploymentType {
    /// Whether a shift tagged `self` accepts a staff member employed as `staff`.
    pub fn accepts(&self, staff: EmploymentType) -> bool {
        matches!(self, EmploymentType::Any) || *self == staff
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EmploymentType::FullTime => "FULL_TIME",
            EmploymentType::PartTime => "PART_TIME",
            EmploymentType::Casual => "CASUAL",
            EmploymentType::Any => "ANY",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for EmploymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FULL_TIME" => Ok(EmploymentType::FullTime),
            "PART_TIME" => Ok(EmploymentType::PartTime),
            "CASUAL" => Ok(EmploymentType::Casual),
            "ANY" => Ok(EmploymentType::Any),
            _ => Err(format!("Unknown employment type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRequirement {
    pub role_id: Uuid,
    pub quantity: i32,
    pub required: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftTemplate {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_staff_allowed: Option<i32>,
    pub employment_type: EmploymentType,
    /// Ordered, unique by `role_id`.
    pub role_requirements: Vec<RoleRequirement>,
    pub is_active: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Checks the role-requirement invariants against a staffing cap.
///
/// Hard: no single role may require more staff than the cap allows — the error names
/// the offending role and the minimum cap it would need. Soft: the summed quantities
/// exceeding the cap only yields an advisory, since one worker may cover several
/// roles.
pub fn check_role_requirements(
    requirements: &[RoleRequirement],
    max_staff_allowed: Option<i32>,
) -> ScheduleResult<Option<String>> {
    for req in requirements {
        if req.quantity < 1 {
            return Err(ScheduleError::Validation(format!(
                "role {} requires a quantity of at least 1",
                req.role_id
            )));
        }
    }
    let mut seen = std::collections::HashSet::new();
    for req in requirements {
        if !seen.insert(req.role_id) {
            return Err(ScheduleError::Validation(format!(
                "role {} appears more than once",
                req.role_id
            )));
        }
    }

    let Some(cap) = max_staff_allowed else {
        return Ok(None);
    };

    if let Some(req) = requirements.iter().find(|r| r.quantity > cap) {
        return Err(ScheduleError::Validation(format!(
            "role {} requires {}, max staff is {}",
            req.role_id, req.quantity, cap
        )));
    }

    let sum: i32 = requirements.iter().map(|r| r.quantity).sum();
    if sum > cap {
        return Ok(Some(format!(
            "role quantities sum to {} against a cap of {}; staff may need to cover multiple roles",
            sum, cap
        )));
    }
    Ok(None)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTemplateRequest {
    pub branch_id: Uuid,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_staff_allowed: Option<i32>,
    pub employment_type: EmploymentType,
    #[serde(default)]
    pub role_requirements: Vec<RoleRequirement>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTemplateRequest {
    pub name: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub max_staff_allowed: Option<Option<i32>>,
    pub employment_type: Option<EmploymentType>,
    pub role_requirements: Option<Vec<RoleRequirement>>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateResponse {
    #[serde(flatten)]
    pub template: ShiftTemplate,
    /// Non-fatal configuration advisory, e.g. summed role quantities over the cap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
}
