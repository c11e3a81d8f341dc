use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ScheduleResult;

/// An externally managed closed date range. `branch_id = None` closes every branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchClosure {
    pub id: Uuid,
    pub branch_id: Option<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BranchClosure {
    /// Inclusive range cover test for one branch and date.
    pub fn covers(&self, branch_id: Uuid, date: NaiveDate) -> bool {
        self.branch_id.is_none_or(|b| b == branch_id)
            && self.start_date <= date
            && date <= self.end_date
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClosureRequest {
    /// `None` closes every branch.
    pub branch_id: Option<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

/// Convenience over a preloaded closure set, used by availability annotation.
pub fn is_closed_on(closures: &[BranchClosure], branch_id: Uuid, date: NaiveDate) -> bool {
    closures.iter().any(|c| c.covers(branch_id, date))
}

/// External collaborator contract: closure management lives outside this core, the
/// scheduler only asks whether a branch operates on a date.
#[async_trait]
pub trait BranchClosureGate: Send + Sync {
    async fn is_closed(&self, branch_id: Uuid, date: NaiveDate) -> ScheduleResult<bool>;
}
