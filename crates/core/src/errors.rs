use thiserror::Error;

use crate::rules::Violation;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A labor-law rule blocked the operation. Check `Violation::overridable` to
    /// decide whether an exception request can resolve it.
    #[error("Labor law violation: {0}")]
    LaborLaw(Violation),

    #[error("Illegal state transition: {0}")]
    State(String),

    /// The shift filled up between the caller's read and this write.
    #[error("Capacity conflict: {0}")]
    CapacityConflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
