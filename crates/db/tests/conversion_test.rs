use chrono::{NaiveDate, NaiveTime, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use shiftflow_core::models::assignment::{AssignmentStatus, AssignmentType};
use shiftflow_core::models::shift::ShiftStatus;
use shiftflow_core::models::template::EmploymentType;
use shiftflow_core::rules::RuleKind;
use shiftflow_db::models::{DbShift, DbShiftAssignment, DbShiftRequest};

fn sample_shift_row() -> DbShift {
    DbShift {
        id: Uuid::new_v4(),
        branch_id: Uuid::new_v4(),
        source_template_id: None,
        date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
        start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        max_staff_allowed: Some(4),
        employment_type: "FULL_TIME".to_string(),
        role_requirements: json!([{"role_id": "barista", "quantity": 2}]),
        status: "PUBLISHED".to_string(),
        notes: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn shift_row_converts_to_core() {
    let shift = sample_shift_row().into_core().unwrap();

    assert_eq!(shift.status, ShiftStatus::Published);
    assert_eq!(shift.employment_type, EmploymentType::FullTime);
    assert_eq!(shift.role_requirements.len(), 1);
    assert_eq!(shift.role_requirements[0].role_id, "barista");
    assert_eq!(shift.role_requirements[0].quantity, 2);
}

#[test]
fn shift_row_with_unknown_status_fails() {
    let mut row = sample_shift_row();
    row.status = "ARCHIVED".to_string();

    assert!(row.into_core().is_err());
}

#[test]
fn shift_row_with_malformed_roles_fails() {
    let mut row = sample_shift_row();
    row.role_requirements = json!({"barista": 2});

    assert!(row.into_core().is_err());
}

#[test]
fn assignment_row_converts_to_core() {
    let row = DbShiftAssignment {
        id: Uuid::new_v4(),
        shift_id: Uuid::new_v4(),
        staff_user_id: Uuid::new_v4(),
        status: "CHECKED_IN".to_string(),
        assignment_type: "OVERTIME".to_string(),
        rest_waived: true,
        notes: Some("approved past weekly cap".to_string()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let assignment = row.into_core().unwrap();
    assert_eq!(assignment.status, AssignmentStatus::CheckedIn);
    assert_eq!(assignment.assignment_type, AssignmentType::Overtime);
    assert!(assignment.rest_waived);
}

#[test]
fn request_row_parses_waived_rule() {
    let row = DbShiftRequest {
        id: Uuid::new_v4(),
        request_type: "OVERTIME".to_string(),
        origin_shift_id: Uuid::new_v4(),
        origin_assignment_id: None,
        target_user_id: None,
        requesting_user_id: Uuid::new_v4(),
        status: "CREATED".to_string(),
        waived_rule: Some("EXCEEDS_WEEKLY_HOURS".to_string()),
        reason: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let request = row.into_core().unwrap();
    assert_eq!(request.waived_rule, Some(RuleKind::ExceedsWeeklyHours));
}
