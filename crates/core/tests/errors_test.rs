use shiftflow_core::errors::{ScheduleError, ScheduleResult};
use shiftflow_core::rules::{RuleKind, ShiftWindow, validate};

fn soft_violation() -> shiftflow_core::rules::Violation {
    let existing = vec![ShiftWindow::new(
        "2024-06-10".parse().unwrap(),
        "09:00:00".parse().unwrap(),
        "13:00:00".parse().unwrap(),
    )];
    let candidate = ShiftWindow::new(
        "2024-06-10".parse().unwrap(),
        "18:00:00".parse().unwrap(),
        "22:00:00".parse().unwrap(),
    );
    validate(&candidate, &existing, &Default::default(), None).expect_err("rest breach")
}

#[test]
fn error_display_formats() {
    let not_found = ScheduleError::NotFound("Shift not found".to_string());
    let validation = ScheduleError::Validation("Invalid input".to_string());
    let state = ScheduleError::State("cannot Cancel a CONFIRMED assignment".to_string());
    let capacity = ScheduleError::CapacityConflict("shift is full".to_string());
    let database = ScheduleError::Database(eyre::eyre!("connection refused"));

    assert_eq!(not_found.to_string(), "Resource not found: Shift not found");
    assert_eq!(validation.to_string(), "Validation error: Invalid input");
    assert!(state.to_string().starts_with("Illegal state transition:"));
    assert!(capacity.to_string().starts_with("Capacity conflict:"));
    assert!(database.to_string().contains("Database error:"));
}

#[test]
fn labor_law_error_carries_the_violation() {
    let violation = soft_violation();
    assert_eq!(violation.kind, RuleKind::InsufficientRest);

    let err = ScheduleError::LaborLaw(violation);
    let text = err.to_string();
    assert!(text.contains("Labor law violation"));
    assert!(text.contains("INSUFFICIENT_REST"));

    match err {
        ScheduleError::LaborLaw(v) => assert!(v.overridable),
        other => panic!("expected LaborLaw, got {other:?}"),
    }
}

#[test]
fn eyre_reports_convert_via_from() {
    let report = eyre::eyre!("row not found");
    let err: ScheduleError = report.into();
    assert!(matches!(err, ScheduleError::Database(_)));
}

#[test]
fn schedule_result_works_with_question_mark() {
    fn inner(fail: bool) -> ScheduleResult<i32> {
        if fail {
            Err(ScheduleError::Validation("bad".into()))
        } else {
            Ok(7)
        }
    }

    fn outer() -> ScheduleResult<i32> {
        let v = inner(false)?;
        Ok(v + 1)
    }

    assert_eq!(outer().unwrap(), 8);
    assert!(inner(true).is_err());
}
