use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::template::EmploymentType;

/// The slice of the staff record this core needs: branch membership and the
/// employment type that shift filters match against. Identity and sessions are an
/// external concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffProfile {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub display_name: String,
    pub employment_type: EmploymentType,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Mirror payload pushed by the upstream identity system. The id is theirs, not ours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertStaffRequest {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub display_name: String,
    pub employment_type: EmploymentType,
    pub is_active: bool,
}
