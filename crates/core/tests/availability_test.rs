use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use pretty_assertions::assert_eq;
use shiftflow_core::availability::{annotate, ensure_registrable};
use shiftflow_core::errors::ScheduleError;
use shiftflow_core::models::closure::{BranchClosure, is_closed_on};
use shiftflow_core::models::shift::{Shift, ShiftStatus};
use shiftflow_core::models::staff::StaffProfile;
use shiftflow_core::models::template::EmploymentType;
use uuid::Uuid;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

fn dt(d: &str, t: &str) -> NaiveDateTime {
    date(d).and_time(time(t))
}

fn shift(branch_id: Uuid, d: &str, status: ShiftStatus) -> Shift {
    let now = Utc::now();
    Shift {
        id: Uuid::new_v4(),
        branch_id,
        source_template_id: None,
        date: date(d),
        start_time: time("09:00"),
        end_time: time("17:00"),
        max_staff_allowed: Some(3),
        employment_type: EmploymentType::Any,
        role_requirements: vec![],
        status,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

fn staff(branch_id: Uuid) -> StaffProfile {
    StaffProfile {
        id: Uuid::new_v4(),
        branch_id,
        display_name: "Sam".to_string(),
        employment_type: EmploymentType::PartTime,
        is_active: true,
        created_at: Utc::now(),
    }
}

#[test]
fn published_open_shift_is_available() {
    let branch = Uuid::new_v4();
    let annotated = annotate(
        shift(branch, "2024-06-10", ShiftStatus::Published),
        dt("2024-06-01", "12:00"),
        1,
        &staff(branch),
        false,
        false,
    );

    assert!(annotated.is_available);
    assert!(!annotated.is_expired);
    assert!(!annotated.is_full);
    assert!(!annotated.is_registered);
    assert_eq!(annotated.registered_count, 1);
}

#[test]
fn drafts_are_never_available() {
    let branch = Uuid::new_v4();
    let annotated = annotate(
        shift(branch, "2024-06-10", ShiftStatus::Draft),
        dt("2024-06-01", "12:00"),
        0,
        &staff(branch),
        false,
        false,
    );

    assert!(!annotated.is_available);
}

#[test]
fn past_shifts_are_expired() {
    let branch = Uuid::new_v4();
    let annotated = annotate(
        shift(branch, "2024-06-10", ShiftStatus::Published),
        dt("2024-06-10", "17:00"),
        0,
        &staff(branch),
        false,
        false,
    );

    assert!(annotated.is_expired);
    assert!(!annotated.is_available);
}

#[test]
fn full_shift_is_flagged_and_unavailable() {
    let branch = Uuid::new_v4();
    // Cap is 3; pending registrations count toward fullness.
    let annotated = annotate(
        shift(branch, "2024-06-10", ShiftStatus::Published),
        dt("2024-06-01", "12:00"),
        3,
        &staff(branch),
        false,
        false,
    );

    assert!(annotated.is_full);
    assert!(!annotated.is_available);
}

#[test]
fn uncapped_shift_is_never_full() {
    let branch = Uuid::new_v4();
    let mut s = shift(branch, "2024-06-10", ShiftStatus::Published);
    s.max_staff_allowed = None;

    let annotated = annotate(s, dt("2024-06-01", "12:00"), 250, &staff(branch), false, false);
    assert!(!annotated.is_full);
    assert!(annotated.is_available);
}

#[test]
fn own_registration_blocks_reregistering() {
    let branch = Uuid::new_v4();
    let annotated = annotate(
        shift(branch, "2024-06-10", ShiftStatus::Published),
        dt("2024-06-01", "12:00"),
        1,
        &staff(branch),
        true,
        false,
    );

    assert!(annotated.is_registered);
    assert!(!annotated.is_available);
}

#[test]
fn employment_type_mismatch_blocks_availability() {
    let branch = Uuid::new_v4();
    let mut s = shift(branch, "2024-06-10", ShiftStatus::Published);
    s.employment_type = EmploymentType::FullTime;

    // Caller is PART_TIME.
    let annotated = annotate(s, dt("2024-06-01", "12:00"), 0, &staff(branch), false, false);
    assert!(!annotated.is_available);
}

#[test]
fn closed_branch_forces_unavailability_for_the_whole_date() {
    let branch = Uuid::new_v4();
    let closures = vec![BranchClosure {
        id: Uuid::new_v4(),
        branch_id: Some(branch),
        start_date: date("2024-12-25"),
        end_date: date("2024-12-25"),
        reason: Some("Christmas".to_string()),
        created_at: Utc::now(),
    }];

    // Capacity and labor-law checks would pass; the closure alone gates it.
    let closed = is_closed_on(&closures, branch, date("2024-12-25"));
    assert!(closed);

    let annotated = annotate(
        shift(branch, "2024-12-25", ShiftStatus::Published),
        dt("2024-12-01", "12:00"),
        0,
        &staff(branch),
        false,
        closed,
    );
    assert!(!annotated.is_available);

    // The day after reopens as normal.
    let open = is_closed_on(&closures, branch, date("2024-12-26"));
    assert!(!open);
}

// --- registration gates ---------------------------------------------------------

#[test]
fn registration_gates_pass_for_a_compatible_caller() {
    let branch = Uuid::new_v4();
    let s = shift(branch, "2024-06-10", ShiftStatus::Published);
    assert!(ensure_registrable(&s, dt("2024-06-01", "12:00"), false, &staff(branch)).is_ok());
}

#[test]
fn employment_type_mismatch_blocks_registration_not_just_listing() {
    let branch = Uuid::new_v4();
    let mut s = shift(branch, "2024-06-10", ShiftStatus::Published);
    s.employment_type = EmploymentType::FullTime;

    // The caller is PART_TIME; the shift must be as closed to a direct
    // registration as it is in the availability listing.
    let err = ensure_registrable(&s, dt("2024-06-01", "12:00"), false, &staff(branch))
        .expect_err("filter must hold");
    match err {
        ScheduleError::Validation(msg) => assert!(msg.contains("FULL_TIME"), "got: {msg}"),
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[test]
fn closed_branch_blocks_registration() {
    let branch = Uuid::new_v4();
    let s = shift(branch, "2024-12-25", ShiftStatus::Published);
    let err = ensure_registrable(&s, dt("2024-12-01", "12:00"), true, &staff(branch))
        .expect_err("closure must gate");
    assert!(matches!(err, ScheduleError::Validation(_)));
}

#[test]
fn draft_expired_and_inactive_callers_are_rejected() {
    let branch = Uuid::new_v4();

    let draft = shift(branch, "2024-06-10", ShiftStatus::Draft);
    assert!(ensure_registrable(&draft, dt("2024-06-01", "12:00"), false, &staff(branch)).is_err());

    let published = shift(branch, "2024-06-10", ShiftStatus::Published);
    assert!(
        ensure_registrable(&published, dt("2024-06-10", "17:00"), false, &staff(branch)).is_err()
    );

    let mut leaver = staff(branch);
    leaver.is_active = false;
    assert!(ensure_registrable(&published, dt("2024-06-01", "12:00"), false, &leaver).is_err());
}

#[test]
fn global_closures_cover_every_branch() {
    let closures = vec![BranchClosure {
        id: Uuid::new_v4(),
        branch_id: None,
        start_date: date("2024-12-24"),
        end_date: date("2024-12-26"),
        reason: None,
        created_at: Utc::now(),
    }];

    assert!(is_closed_on(&closures, Uuid::new_v4(), date("2024-12-25")));
    assert!(!is_closed_on(&closures, Uuid::new_v4(), date("2024-12-27")));
}
