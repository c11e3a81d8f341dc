//! Per-caller availability annotation for published and draft shifts.
//!
//! The db layer supplies raw facts (active-assignment count, whether the caller
//! already holds an assignment, whether the branch is closed that date); this module
//! turns them into the flags staff clients render.

use chrono::NaiveDateTime;

use crate::errors::{ScheduleError, ScheduleResult};
use crate::models::shift::{AvailableShift, Shift, ShiftStatus};
use crate::models::staff::StaffProfile;

/// The gates every registration path shares: PUBLISHED, not expired, branch open,
/// and a live profile the shift's employment filter accepts. Capacity and labor-law
/// rules run afterwards, inside the registration transaction.
///
/// The same facts drive [`annotate`]'s `is_available` flag, so a shift shown as
/// unavailable cannot be joined by posting the registration directly.
pub fn ensure_registrable(
    shift: &Shift,
    now: NaiveDateTime,
    branch_closed: bool,
    caller: &StaffProfile,
) -> ScheduleResult<()> {
    if shift.status != ShiftStatus::Published {
        return Err(ScheduleError::Validation(format!(
            "shift {} is not published",
            shift.id
        )));
    }
    if shift.is_expired(now) {
        return Err(ScheduleError::Validation(format!(
            "shift {} has already ended",
            shift.id
        )));
    }
    if branch_closed {
        return Err(ScheduleError::Validation(format!(
            "branch {} is closed on {}",
            shift.branch_id, shift.date
        )));
    }
    if !caller.is_active {
        return Err(ScheduleError::Validation(format!(
            "staff profile {} is inactive",
            caller.id
        )));
    }
    if !shift.employment_type.accepts(caller.employment_type) {
        return Err(ScheduleError::Validation(format!(
            "shift {} accepts only {} staff",
            shift.id, shift.employment_type
        )));
    }
    Ok(())
}

/// Annotates one shift for one caller.
///
/// `is_available` requires every gate at once: published, not expired, not full, not
/// already registered, branch open that date, and an employment type the caller's
/// profile satisfies. A closed branch forces unavailability regardless of capacity
/// or labor-law outcomes.
pub fn annotate(
    shift: Shift,
    now: NaiveDateTime,
    active_count: i64,
    caller: &StaffProfile,
    caller_registered: bool,
    branch_closed: bool,
) -> AvailableShift {
    let is_expired = shift.is_expired(now);
    let is_full = shift
        .max_staff_allowed
        .map(|cap| active_count >= cap as i64)
        .unwrap_or(false);
    let employment_ok = shift.employment_type.accepts(caller.employment_type);

    let is_available = shift.status == ShiftStatus::Published
        && !is_expired
        && !is_full
        && !caller_registered
        && !branch_closed
        && employment_ok;

    AvailableShift {
        registered_count: active_count,
        is_expired,
        is_full,
        is_registered: caller_registered,
        is_available,
        shift,
    }
}
