use crate::models::{DbShift, NewShift};
use chrono::{NaiveDate, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shiftflow_core::models::shift::{UpdateDraftRequest, UpdatePublishedRequest};

const SHIFT_COLUMNS: &str = "id, branch_id, source_template_id, date, start_time, end_time, \
     max_staff_allowed, employment_type, role_requirements, status, notes, created_at, updated_at";

pub async fn create_draft(pool: &Pool<Postgres>, new: &NewShift) -> Result<DbShift> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating draft shift: id={}, branch={}, date={}",
        id,
        new.branch_id,
        new.date
    );

    let shift = sqlx::query_as::<_, DbShift>(&format!(
        r#"
        INSERT INTO shifts
            (id, branch_id, source_template_id, date, start_time, end_time,
             max_staff_allowed, employment_type, role_requirements, status, notes,
             created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'DRAFT', $10, $11, $11)
        RETURNING {SHIFT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(new.branch_id)
    .bind(new.source_template_id)
    .bind(new.date)
    .bind(new.start_time)
    .bind(new.end_time)
    .bind(new.max_staff_allowed)
    .bind(new.employment_type.to_string())
    .bind(serde_json::to_value(&new.role_requirements)?)
    .bind(&new.notes)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(shift)
}

pub async fn get_shift_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbShift>> {
    let shift = sqlx::query_as::<_, DbShift>(&format!(
        r#"
        SELECT {SHIFT_COLUMNS}
        FROM shifts
        WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(shift)
}

/// Updates a draft in place. Guarded on status so a concurrent publish cannot be
/// overwritten; returns `None` when the shift is missing or no longer DRAFT.
pub async fn update_draft(
    pool: &Pool<Postgres>,
    id: Uuid,
    req: &UpdateDraftRequest,
) -> Result<Option<DbShift>> {
    let Some(current) = get_shift_by_id(pool, id).await? else {
        return Ok(None);
    };

    let date = req.date.unwrap_or(current.date);
    let start_time = req.start_time.unwrap_or(current.start_time);
    let end_time = req.end_time.unwrap_or(current.end_time);
    let max_staff_allowed = req.max_staff_allowed.unwrap_or(current.max_staff_allowed);
    let employment_type = req
        .employment_type
        .map(|e| e.to_string())
        .unwrap_or(current.employment_type);
    let role_requirements = match &req.role_requirements {
        Some(roles) => serde_json::to_value(roles)?,
        None => current.role_requirements,
    };
    let notes = req.notes.clone().or(current.notes);

    let shift = sqlx::query_as::<_, DbShift>(&format!(
        r#"
        UPDATE shifts
        SET date = $2, start_time = $3, end_time = $4, max_staff_allowed = $5,
            employment_type = $6, role_requirements = $7, notes = $8, updated_at = $9
        WHERE id = $1 AND status = 'DRAFT'
        RETURNING {SHIFT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(date)
    .bind(start_time)
    .bind(end_time)
    .bind(max_staff_allowed)
    .bind(employment_type)
    .bind(role_requirements)
    .bind(notes)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    Ok(shift)
}

/// DRAFT -> PUBLISHED, irreversible. Returns `None` when missing or already
/// published.
pub async fn publish_shift(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbShift>> {
    tracing::debug!("Publishing shift: id={}", id);

    let shift = sqlx::query_as::<_, DbShift>(&format!(
        r#"
        UPDATE shifts
        SET status = 'PUBLISHED', updated_at = $2
        WHERE id = $1 AND status = 'DRAFT'
        RETURNING {SHIFT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    Ok(shift)
}

/// Deletes a draft; published shifts are untouchable. Returns whether a row went.
pub async fn delete_draft(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM shifts
        WHERE id = $1 AND status = 'DRAFT'
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// The published-shift mutability carve-out: capacity and notes only.
pub async fn update_published(
    pool: &Pool<Postgres>,
    id: Uuid,
    req: &UpdatePublishedRequest,
) -> Result<Option<DbShift>> {
    let Some(current) = get_shift_by_id(pool, id).await? else {
        return Ok(None);
    };
    let max_staff_allowed = req.max_staff_allowed.unwrap_or(current.max_staff_allowed);
    let notes = req.notes.clone().or(current.notes);

    let shift = sqlx::query_as::<_, DbShift>(&format!(
        r#"
        UPDATE shifts
        SET max_staff_allowed = $2, notes = $3, updated_at = $4
        WHERE id = $1 AND status = 'PUBLISHED'
        RETURNING {SHIFT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(max_staff_allowed)
    .bind(notes)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    Ok(shift)
}

pub async fn list_shifts(
    pool: &Pool<Postgres>,
    branch_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
    published_only: bool,
) -> Result<Vec<DbShift>> {
    let shifts = sqlx::query_as::<_, DbShift>(&format!(
        r#"
        SELECT {SHIFT_COLUMNS}
        FROM shifts
        WHERE branch_id = $1 AND date BETWEEN $2 AND $3
          AND (NOT $4 OR status = 'PUBLISHED')
        ORDER BY date ASC, start_time ASC
        "#
    ))
    .bind(branch_id)
    .bind(start_date)
    .bind(end_date)
    .bind(published_only)
    .fetch_all(pool)
    .await?;

    Ok(shifts)
}

/// Non-cancelled, non-rejected assignments on a shift; the implicit capacity
/// counter.
pub async fn count_active_assignments(pool: &Pool<Postgres>, shift_id: Uuid) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM shift_assignments
        WHERE shift_id = $1
          AND status IN ('PENDING', 'CONFIRMED', 'CHECKED_IN', 'CHECKED_OUT')
        "#,
    )
    .bind(shift_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

pub async fn staff_has_active_assignment(
    pool: &Pool<Postgres>,
    shift_id: Uuid,
    staff_user_id: Uuid,
) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM shift_assignments
            WHERE shift_id = $1 AND staff_user_id = $2
              AND status IN ('PENDING', 'CONFIRMED', 'CHECKED_IN', 'CHECKED_OUT')
        )
        "#,
    )
    .bind(shift_id)
    .bind(staff_user_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}
