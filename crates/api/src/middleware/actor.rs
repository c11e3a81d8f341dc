//! # Actor Extraction
//!
//! Authentication lives upstream; by the time a request reaches this service the
//! gateway has resolved the caller and forwarded their identity in headers.
//! This module extracts that identity into a typed [`Actor`] and enforces the
//! manager/staff split on routes that need it.
//!
//! Headers: `X-Staff-Id` (UUID, required) and `X-Staff-Role` (`manager` or `staff`,
//! defaults to `staff`).

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use shiftflow_core::errors::ScheduleError;

use crate::middleware::error_handling::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRole {
    Manager,
    Staff,
}

/// The authenticated caller, as asserted by the upstream gateway.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub staff_id: Uuid,
    pub role: ActorRole,
}

impl Actor {
    pub fn is_manager(&self) -> bool {
        self.role == ActorRole::Manager
    }

    pub fn ensure_manager(&self) -> Result<(), AppError> {
        if !self.is_manager() {
            return Err(AppError(ScheduleError::Forbidden(
                "manager role required".to_string(),
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let staff_id = parts
            .headers
            .get("x-staff-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError(ScheduleError::Forbidden(
                    "missing X-Staff-Id header".to_string(),
                ))
            })?
            .parse::<Uuid>()
            .map_err(|_| {
                AppError(ScheduleError::Validation(
                    "X-Staff-Id is not a valid UUID".to_string(),
                ))
            })?;

        let role = match parts
            .headers
            .get("x-staff-role")
            .and_then(|v| v.to_str().ok())
        {
            Some("manager") => ActorRole::Manager,
            Some("staff") | None => ActorRole::Staff,
            Some(other) => {
                return Err(AppError(ScheduleError::Validation(format!(
                    "unknown role: {}",
                    other
                ))));
            }
        };

        Ok(Actor { staff_id, role })
    }
}
