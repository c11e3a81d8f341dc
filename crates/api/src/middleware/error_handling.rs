//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and JSON error responses, ensuring a
//! consistent error surface across the entire API.
//!
//! Labor-law breaches get two codes: 409 for overridable violations, where the
//! response body carries the rule and an exception-request hint, and 422 for hard
//! violations that no request can waive.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use shiftflow_core::errors::ScheduleError;

/// Application error wrapper that provides HTTP status code mapping.
///
/// `AppError` wraps domain-specific `ScheduleError` instances and implements
/// `IntoResponse` to convert them into HTTP responses with appropriate status codes
/// and JSON payloads.
#[derive(Debug)]
pub struct AppError(pub ScheduleError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let ScheduleError::LaborLaw(violation) = &self.0 {
            let status = if violation.overridable {
                StatusCode::CONFLICT
            } else {
                StatusCode::UNPROCESSABLE_ENTITY
            };
            let mut body = json!({
                "error": violation.to_string(),
                "rule": violation.kind.to_string(),
                "overridable": violation.overridable,
            });
            if violation.overridable {
                body["suggestion"] =
                    json!("submit an OVERTIME exception request to waive this rule");
            }
            return (status, Json(body)).into_response();
        }

        let status = match &self.0 {
            ScheduleError::NotFound(_) => StatusCode::NOT_FOUND,
            ScheduleError::Validation(_) => StatusCode::BAD_REQUEST,
            ScheduleError::State(_) => StatusCode::CONFLICT,
            ScheduleError::CapacityConflict(_) => StatusCode::CONFLICT,
            ScheduleError::Forbidden(_) => StatusCode::FORBIDDEN,
            ScheduleError::LaborLaw(_) => unreachable!(),
            ScheduleError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ScheduleError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = self.0.to_string();
        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

/// Allows `?` on `Result<T, ScheduleError>` in handlers returning
/// `Result<T, AppError>`.
impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        AppError(err)
    }
}

/// Allows `?` on repository results; infrastructure failures surface as 500s.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(ScheduleError::Database(err))
    }
}
