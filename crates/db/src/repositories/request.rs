use crate::models::DbShiftRequest;
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shiftflow_core::models::request::{CreateRequestRequest, RequestStatus, RequestType};

const REQUEST_COLUMNS: &str = "id, request_type, origin_shift_id, origin_assignment_id, \
     target_user_id, requesting_user_id, status, waived_rule, reason, created_at, updated_at";

pub async fn create_request(
    pool: &Pool<Postgres>,
    req: &CreateRequestRequest,
    requesting_user_id: Uuid,
    origin_assignment_id: Option<Uuid>,
) -> Result<DbShiftRequest> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating {} request: id={}, shift={}, requester={}",
        req.request_type,
        id,
        req.shift_id,
        requesting_user_id
    );

    let request = sqlx::query_as::<_, DbShiftRequest>(&format!(
        r#"
        INSERT INTO shift_requests
            (id, request_type, origin_shift_id, origin_assignment_id, target_user_id,
             requesting_user_id, status, waived_rule, reason, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, 'CREATED', $7, $8, $9, $9)
        RETURNING {REQUEST_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(req.request_type.to_string())
    .bind(req.shift_id)
    .bind(origin_assignment_id)
    .bind(req.target_user_id)
    .bind(requesting_user_id)
    .bind(req.waived_rule.map(|r| r.to_string()))
    .bind(&req.reason)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(request)
}

pub async fn get_request_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbShiftRequest>> {
    let request = sqlx::query_as::<_, DbShiftRequest>(&format!(
        r#"
        SELECT {REQUEST_COLUMNS}
        FROM shift_requests
        WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(request)
}

/// Compare-and-set on the request status. The caller has already run the core
/// state checks; the guard here closes the window against a concurrent resolver.
/// Returns `None` when the request moved out from under us.
pub async fn set_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    from: RequestStatus,
    to: RequestStatus,
) -> Result<Option<DbShiftRequest>> {
    let request = sqlx::query_as::<_, DbShiftRequest>(&format!(
        r#"
        UPDATE shift_requests
        SET status = $3, updated_at = $4
        WHERE id = $1 AND status = $2
        RETURNING {REQUEST_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(from.to_string())
    .bind(to.to_string())
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    Ok(request)
}

/// One open request of a given type per staff member per shift.
pub async fn has_open_request(
    pool: &Pool<Postgres>,
    shift_id: Uuid,
    requesting_user_id: Uuid,
    request_type: RequestType,
) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM shift_requests
            WHERE origin_shift_id = $1 AND requesting_user_id = $2
              AND request_type = $3
              AND status IN ('CREATED', 'TARGET_RESPONDED')
        )
        "#,
    )
    .bind(shift_id)
    .bind(requesting_user_id)
    .bind(request_type.to_string())
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Requests the staff member is party to, as requester or swap target.
pub async fn list_for_staff(
    pool: &Pool<Postgres>,
    staff_user_id: Uuid,
) -> Result<Vec<DbShiftRequest>> {
    let requests = sqlx::query_as::<_, DbShiftRequest>(&format!(
        r#"
        SELECT {REQUEST_COLUMNS}
        FROM shift_requests
        WHERE requesting_user_id = $1 OR target_user_id = $1
        ORDER BY created_at DESC
        "#
    ))
    .bind(staff_user_id)
    .fetch_all(pool)
    .await?;

    Ok(requests)
}

/// The manager's approval queue: open requests against a branch's shifts.
pub async fn list_open_for_branch(
    pool: &Pool<Postgres>,
    branch_id: Uuid,
) -> Result<Vec<DbShiftRequest>> {
    let requests = sqlx::query_as::<_, DbShiftRequest>(
        r#"
        SELECT r.id, r.request_type, r.origin_shift_id, r.origin_assignment_id,
               r.target_user_id, r.requesting_user_id, r.status, r.waived_rule,
               r.reason, r.created_at, r.updated_at
        FROM shift_requests r
        JOIN shifts s ON s.id = r.origin_shift_id
        WHERE s.branch_id = $1 AND r.status IN ('CREATED', 'TARGET_RESPONDED')
        ORDER BY r.created_at ASC
        "#,
    )
    .bind(branch_id)
    .fetch_all(pool)
    .await?;

    Ok(requests)
}
