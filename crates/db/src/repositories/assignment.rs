use crate::models::{DbShiftAssignment, DbStaffAssignmentRow};
use chrono::{Days, NaiveDate, Utc};
use eyre::eyre;
use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

use shiftflow_core::errors::{ScheduleError, ScheduleResult};
use shiftflow_core::models::assignment::{AssignmentAction, AssignmentStatus, AssignmentType};
use shiftflow_core::models::shift::Shift;
use shiftflow_core::rules::{self, RuleConfig, RuleKind, ShiftWindow};

const ASSIGNMENT_COLUMNS: &str = "id, shift_id, staff_user_id, status, assignment_type, \
     rest_waived, notes, created_at, updated_at";

/// How a registration is validated.
#[derive(Debug, Clone, Copy)]
pub enum RegistrationMode {
    /// Normal staff self-registration, every rule enforced.
    Regular,
    /// Replay of a blocked registration under an approved overtime request: soft
    /// rules waived wholesale, hard rules and ceilings still enforced.
    SanctionedOvertime,
}

fn db_err(e: impl Into<eyre::Report>) -> ScheduleError {
    ScheduleError::Database(e.into())
}

/// Serializes all schedule mutations for one staff member or one shift.
/// Advisory locks release on transaction end, so validate-then-insert is atomic
/// against concurrent registrations.
async fn acquire_lock(conn: &mut PgConnection, id: Uuid) -> ScheduleResult<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
        .bind(id)
        .execute(conn)
        .await
        .map_err(db_err)?;
    Ok(())
}

/// The staff member's active scheduled windows around `date`, wide enough for
/// every rule: the ISO week, a maximal consecutive run, and the weekend cap's
/// calendar month all fit inside +/- 31 days.
async fn load_schedule_windows(
    conn: &mut PgConnection,
    staff_user_id: Uuid,
    date: NaiveDate,
) -> ScheduleResult<Vec<ShiftWindow>> {
    let from = date.checked_sub_days(Days::new(31)).unwrap_or(date);
    let to = date.checked_add_days(Days::new(31)).unwrap_or(date);

    let rows = sqlx::query_as::<_, (NaiveDate, chrono::NaiveTime, chrono::NaiveTime)>(
        r#"
        SELECT s.date, s.start_time, s.end_time
        FROM shift_assignments a
        JOIN shifts s ON s.id = a.shift_id
        WHERE a.staff_user_id = $1
          AND a.status IN ('PENDING', 'CONFIRMED', 'CHECKED_IN', 'CHECKED_OUT')
          AND s.date BETWEEN $2 AND $3
        "#,
    )
    .bind(staff_user_id)
    .bind(from)
    .bind(to)
    .fetch_all(conn)
    .await
    .map_err(db_err)?;

    Ok(rows
        .into_iter()
        .map(|(date, start, end)| ShiftWindow::new(date, start, end))
        .collect())
}

async fn count_active_in_tx(conn: &mut PgConnection, shift_id: Uuid) -> ScheduleResult<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM shift_assignments
        WHERE shift_id = $1
          AND status IN ('PENDING', 'CONFIRMED', 'CHECKED_IN', 'CHECKED_OUT')
        "#,
    )
    .bind(shift_id)
    .fetch_one(conn)
    .await
    .map_err(db_err)
}

#[allow(clippy::too_many_arguments)]
async fn insert_assignment(
    conn: &mut PgConnection,
    shift_id: Uuid,
    staff_user_id: Uuid,
    status: AssignmentStatus,
    assignment_type: AssignmentType,
    rest_waived: bool,
    notes: Option<&str>,
) -> ScheduleResult<DbShiftAssignment> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query_as::<_, DbShiftAssignment>(&format!(
        r#"
        INSERT INTO shift_assignments
            (id, shift_id, staff_user_id, status, assignment_type, rest_waived, notes,
             created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
        RETURNING {ASSIGNMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(shift_id)
    .bind(staff_user_id)
    .bind(status.to_string())
    .bind(assignment_type.to_string())
    .bind(rest_waived)
    .bind(notes)
    .bind(now)
    .fetch_one(conn)
    .await
    .map_err(db_err)
}

/// Check-then-insert registration as one atomic unit, serialized per staff member
/// and per shift. Two concurrent attempts can neither overbook a near-full shift
/// nor give one person overlapping assignments.
///
/// The validator runs inside the transaction and never mutates; on any failure the
/// transaction rolls back untouched.
pub async fn register_validated(
    pool: &Pool<Postgres>,
    staff_user_id: Uuid,
    shift: &Shift,
    cfg: &RuleConfig,
    mode: RegistrationMode,
    notes: Option<&str>,
) -> ScheduleResult<DbShiftAssignment> {
    let mut tx = pool.begin().await.map_err(db_err)?;

    acquire_lock(&mut *tx, staff_user_id).await?;
    acquire_lock(&mut *tx, shift.id).await?;

    // Duplicate registration check.
    let already = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM shift_assignments
            WHERE shift_id = $1 AND staff_user_id = $2
              AND status IN ('PENDING', 'CONFIRMED', 'CHECKED_IN', 'CHECKED_OUT')
        )
        "#,
    )
    .bind(shift.id)
    .bind(staff_user_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(db_err)?;
    if already {
        return Err(ScheduleError::Validation(format!(
            "staff {} is already registered for shift {}",
            staff_user_id, shift.id
        )));
    }

    // Capacity: the shared counter is the live count of active assignments.
    if let Some(cap) = shift.max_staff_allowed {
        let count = count_active_in_tx(&mut *tx, shift.id).await?;
        if count >= cap as i64 {
            return Err(ScheduleError::CapacityConflict(format!(
                "shift {} already has {} of {} staff",
                shift.id, count, cap
            )));
        }
    }

    let existing = load_schedule_windows(&mut *tx, staff_user_id, shift.date).await?;
    let candidate = shift.window();

    let (assignment_type, rest_waived) = match mode {
        RegistrationMode::Regular => {
            rules::validate(&candidate, &existing, cfg, None)
                .map_err(ScheduleError::LaborLaw)?;
            (AssignmentType::Regular, false)
        }
        RegistrationMode::SanctionedOvertime => {
            let bypassed = rules::validate_overtime(&candidate, &existing, cfg)
                .map_err(ScheduleError::LaborLaw)?;
            (
                AssignmentType::Overtime,
                bypassed.contains(&RuleKind::InsufficientRest),
            )
        }
    };

    let assignment = insert_assignment(
        &mut *tx,
        shift.id,
        staff_user_id,
        AssignmentStatus::Pending,
        assignment_type,
        rest_waived,
        notes,
    )
    .await?;

    tx.commit().await.map_err(db_err)?;

    tracing::debug!(
        "Registered assignment {} for staff {} on shift {} ({})",
        assignment.id,
        staff_user_id,
        shift.id,
        assignment.assignment_type
    );
    Ok(assignment)
}

pub async fn get_assignment_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> ScheduleResult<Option<DbShiftAssignment>> {
    sqlx::query_as::<_, DbShiftAssignment>(&format!(
        r#"
        SELECT {ASSIGNMENT_COLUMNS}
        FROM shift_assignments
        WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(db_err)
}

/// Applies one lifecycle action under a row lock. The legal-transition table lives
/// in the core state machine; an illegal action rolls back with a STATE error and
/// the row untouched.
pub async fn transition(
    pool: &Pool<Postgres>,
    id: Uuid,
    action: AssignmentAction,
    note: Option<&str>,
) -> ScheduleResult<DbShiftAssignment> {
    let mut tx = pool.begin().await.map_err(db_err)?;

    let row = sqlx::query_as::<_, DbShiftAssignment>(&format!(
        r#"
        SELECT {ASSIGNMENT_COLUMNS}
        FROM shift_assignments
        WHERE id = $1
        FOR UPDATE
        "#
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(db_err)?
    .ok_or_else(|| ScheduleError::NotFound(format!("Assignment with ID {} not found", id)))?;

    let current: AssignmentStatus = row
        .status
        .parse()
        .map_err(|e: String| db_err(eyre!(e)))?;
    let next = action.apply(current)?;

    let updated = sqlx::query_as::<_, DbShiftAssignment>(&format!(
        r#"
        UPDATE shift_assignments
        SET status = $2, notes = COALESCE($3, notes), updated_at = $4
        WHERE id = $1
        RETURNING {ASSIGNMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(next.to_string())
    .bind(note)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await
    .map_err(db_err)?;

    tx.commit().await.map_err(db_err)?;
    Ok(updated)
}

/// Cancels an assignment that has not yet been worked to completion. Used by
/// approved LEAVE requests, which may land after the assignment was confirmed.
pub async fn cancel_active(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> ScheduleResult<Option<DbShiftAssignment>> {
    sqlx::query_as::<_, DbShiftAssignment>(&format!(
        r#"
        UPDATE shift_assignments
        SET status = 'CANCELLED', updated_at = $2
        WHERE id = $1 AND status IN ('PENDING', 'CONFIRMED', 'CHECKED_IN')
        RETURNING {ASSIGNMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await
    .map_err(db_err)
}

/// The requester's active assignment on a shift, if any.
pub async fn find_active_for_staff(
    pool: &Pool<Postgres>,
    shift_id: Uuid,
    staff_user_id: Uuid,
) -> ScheduleResult<Option<DbShiftAssignment>> {
    sqlx::query_as::<_, DbShiftAssignment>(&format!(
        r#"
        SELECT {ASSIGNMENT_COLUMNS}
        FROM shift_assignments
        WHERE shift_id = $1 AND staff_user_id = $2
          AND status IN ('PENDING', 'CONFIRMED', 'CHECKED_IN', 'CHECKED_OUT')
        "#
    ))
    .bind(shift_id)
    .bind(staff_user_id)
    .fetch_optional(pool)
    .await
    .map_err(db_err)
}

pub async fn list_for_shift(
    pool: &Pool<Postgres>,
    shift_id: Uuid,
) -> ScheduleResult<Vec<DbShiftAssignment>> {
    sqlx::query_as::<_, DbShiftAssignment>(&format!(
        r#"
        SELECT {ASSIGNMENT_COLUMNS}
        FROM shift_assignments
        WHERE shift_id = $1
        ORDER BY created_at ASC
        "#
    ))
    .bind(shift_id)
    .fetch_all(pool)
    .await
    .map_err(db_err)
}

/// A staff member's assignments joined with their shift windows, for schedule
/// views and reconciliation refetches.
pub async fn list_for_staff_range(
    pool: &Pool<Postgres>,
    staff_user_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> ScheduleResult<Vec<DbStaffAssignmentRow>> {
    sqlx::query_as::<_, DbStaffAssignmentRow>(
        r#"
        SELECT a.id, a.shift_id, a.staff_user_id, a.status, a.assignment_type,
               a.rest_waived, a.notes, a.created_at, a.updated_at,
               s.branch_id, s.date, s.start_time, s.end_time
        FROM shift_assignments a
        JOIN shifts s ON s.id = a.shift_id
        WHERE a.staff_user_id = $1 AND s.date BETWEEN $2 AND $3
        ORDER BY s.date ASC, s.start_time ASC
        "#,
    )
    .bind(staff_user_id)
    .bind(start_date)
    .bind(end_date)
    .fetch_all(pool)
    .await
    .map_err(db_err)
}

/// SWAP approval: cancel the origin assignment and create a confirmed assignment
/// for the target, all-or-nothing. The origin belongs to the requester, so the
/// target's schedule is validated as-is against the handed-off window.
pub async fn swap_transfer(
    pool: &Pool<Postgres>,
    origin_assignment_id: Uuid,
    target_user_id: Uuid,
    shift: &Shift,
    cfg: &RuleConfig,
) -> ScheduleResult<(DbShiftAssignment, DbShiftAssignment)> {
    let mut tx = pool.begin().await.map_err(db_err)?;

    acquire_lock(&mut *tx, target_user_id).await?;
    acquire_lock(&mut *tx, shift.id).await?;

    let origin = sqlx::query_as::<_, DbShiftAssignment>(&format!(
        r#"
        SELECT {ASSIGNMENT_COLUMNS}
        FROM shift_assignments
        WHERE id = $1
        FOR UPDATE
        "#
    ))
    .bind(origin_assignment_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(db_err)?
    .ok_or_else(|| {
        ScheduleError::NotFound(format!(
            "Assignment with ID {} not found",
            origin_assignment_id
        ))
    })?;

    let origin_status: AssignmentStatus = origin
        .status
        .parse()
        .map_err(|e: String| db_err(eyre!(e)))?;
    if !origin_status.is_active() {
        return Err(ScheduleError::State(format!(
            "origin assignment {} is {}, nothing to hand off",
            origin.id, origin_status
        )));
    }

    let existing = load_schedule_windows(&mut *tx, target_user_id, shift.date).await?;
    rules::validate(&shift.window(), &existing, cfg, None).map_err(ScheduleError::LaborLaw)?;

    let cancelled = sqlx::query_as::<_, DbShiftAssignment>(&format!(
        r#"
        UPDATE shift_assignments
        SET status = 'CANCELLED', updated_at = $2
        WHERE id = $1
        RETURNING {ASSIGNMENT_COLUMNS}
        "#
    ))
    .bind(origin.id)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await
    .map_err(db_err)?;

    // The swap was manager-approved, so the incoming assignment starts CONFIRMED.
    let created = insert_assignment(
        &mut *tx,
        shift.id,
        target_user_id,
        AssignmentStatus::Confirmed,
        AssignmentType::Regular,
        false,
        None,
    )
    .await?;

    tx.commit().await.map_err(db_err)?;
    Ok((cancelled, created))
}
