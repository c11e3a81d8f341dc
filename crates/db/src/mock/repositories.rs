use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::mock;
use uuid::Uuid;

use shiftflow_core::errors::ScheduleResult;
use shiftflow_core::models::closure::BranchClosureGate;

mock! {
    /// Scripted closure calendar for tests that need exact call expectations.
    pub ClosureGate {}

    #[async_trait]
    impl BranchClosureGate for ClosureGate {
        async fn is_closed(&self, branch_id: Uuid, date: NaiveDate) -> ScheduleResult<bool>;
    }
}

/// In-memory closure calendar for tests that exercise the gate seam.
#[derive(Debug, Default, Clone)]
pub struct StaticClosureGate {
    closed_dates: Vec<(Option<Uuid>, NaiveDate)>,
}

impl StaticClosureGate {
    pub fn closed_on(mut self, branch_id: Option<Uuid>, date: NaiveDate) -> Self {
        self.closed_dates.push((branch_id, date));
        self
    }
}

#[async_trait]
impl BranchClosureGate for StaticClosureGate {
    async fn is_closed(&self, branch_id: Uuid, date: NaiveDate) -> ScheduleResult<bool> {
        Ok(self
            .closed_dates
            .iter()
            .any(|(b, d)| *d == date && (b.is_none() || *b == Some(branch_id))))
    }
}
