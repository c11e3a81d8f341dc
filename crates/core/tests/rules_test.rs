use chrono::{NaiveDate, NaiveTime};
use pretty_assertions::assert_eq;
use rstest::rstest;
use shiftflow_core::rules::{
    RuleConfig, RuleKind, ShiftWindow, validate, validate_overtime,
};

fn date(s: &str) -> NaiveDate {
    s.parse().expect("valid date literal")
}

fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").expect("valid time literal")
}

fn win(d: &str, start: &str, end: &str) -> ShiftWindow {
    ShiftWindow::new(date(d), time(start), time(end))
}

fn kind_of(result: Result<(), shiftflow_core::rules::Violation>) -> RuleKind {
    result.expect_err("expected a violation").kind
}

// --- TIME_CONFLICT -------------------------------------------------------------

#[rstest]
#[case("10:00", "12:00")] // fully inside
#[case("08:00", "10:00")] // overlaps the start
#[case("16:00", "19:00")] // overlaps the end
#[case("09:00", "17:00")] // identical window
#[case("08:00", "18:00")] // envelops
fn overlap_always_conflicts(#[case] start: &str, #[case] end: &str) {
    let cfg = RuleConfig::default();
    let existing = vec![win("2024-06-10", "09:00", "17:00")];
    let candidate = win("2024-06-10", start, end);

    let violation = validate(&candidate, &existing, &cfg, None).expect_err("must conflict");
    assert_eq!(violation.kind, RuleKind::TimeConflict);
    assert!(!violation.overridable, "time conflicts are never waivable");
}

#[test]
fn conflict_ignores_waivers_and_hour_totals() {
    let cfg = RuleConfig::default();
    // Tiny windows, nowhere near any hour cap.
    let existing = vec![win("2024-06-10", "09:00", "09:30")];
    let candidate = win("2024-06-10", "09:15", "09:45");

    let violation = validate(&candidate, &existing, &cfg, Some(RuleKind::ExceedsDailyHours))
        .expect_err("must conflict");
    assert_eq!(violation.kind, RuleKind::TimeConflict);

    let violation = validate_overtime(&candidate, &existing, &cfg).expect_err("must conflict");
    assert_eq!(violation.kind, RuleKind::TimeConflict);
}

#[test]
fn same_window_different_dates_is_fine() {
    let cfg = RuleConfig::default();
    let existing = vec![win("2024-06-10", "09:00", "17:00")];
    let candidate = win("2024-06-12", "09:00", "17:00");

    assert!(validate(&candidate, &existing, &cfg, None).is_ok());
}

// --- EXCEEDS_DAILY_HOURS -------------------------------------------------------

#[test]
fn daily_cap_breach_is_soft() {
    let cfg = RuleConfig::default();
    // 8h confirmed plus 4h candidate: 12h, over the 8h cap but within the ceiling.
    // Daily hours outranks rest, so an evening add-on surfaces this rule first.
    let existing = vec![win("2024-06-10", "09:00", "17:00")];
    let candidate = win("2024-06-10", "18:00", "22:00");

    let violation = validate(&candidate, &existing, &cfg, None).expect_err("over the cap");
    assert_eq!(violation.kind, RuleKind::ExceedsDailyHours);
    assert!(violation.overridable);
}

#[test]
fn daily_overtime_ceiling_is_hard_even_when_waived() {
    let cfg = RuleConfig::default();
    // 8h existing + 5h candidate = 13h > 12h ceiling.
    let existing = vec![win("2024-06-10", "08:00", "16:00")];
    let candidate = win("2024-06-10", "17:00", "22:00");

    let violation = validate(&candidate, &existing, &cfg, Some(RuleKind::ExceedsDailyHours))
        .expect_err("over the ceiling");
    assert_eq!(violation.kind, RuleKind::ExceedsDailyHours);
    assert!(!violation.overridable);

    let violation = validate_overtime(&candidate, &existing, &cfg).expect_err("over the ceiling");
    assert_eq!(violation.kind, RuleKind::ExceedsDailyHours);
}

#[test]
fn waived_daily_cap_passes_within_ceiling() {
    let cfg = RuleConfig::default();
    // 4h + 8h = 12h, exactly the ceiling; the 11h rest gap between them holds.
    let existing = vec![win("2024-06-10", "00:00", "04:00")];
    let candidate = win("2024-06-10", "15:00", "23:00");

    assert!(validate(&candidate, &existing, &cfg, Some(RuleKind::ExceedsDailyHours)).is_ok());
}

// --- EXCEEDS_WEEKLY_HOURS ------------------------------------------------------

#[test]
fn weekly_cap_breach_is_soft() {
    let cfg = RuleConfig::default();
    // Mon-Fri 8h each (40h), Saturday candidate pushes the ISO week to 48h.
    let existing: Vec<_> = (10..=14)
        .map(|d| win(&format!("2024-06-{d}"), "09:00", "17:00"))
        .collect();
    let candidate = win("2024-06-15", "09:00", "17:00");

    let violation = validate(&candidate, &existing, &cfg, None).expect_err("over weekly cap");
    assert_eq!(violation.kind, RuleKind::ExceedsWeeklyHours);
    assert!(violation.overridable);
}

#[test]
fn weekly_overtime_ceiling_is_hard() {
    let cfg = RuleConfig::default();
    // Mon-Sat 8h each (48h) plus a 5h Sunday: 53h > 52h ceiling.
    let existing: Vec<_> = (10..=15)
        .map(|d| win(&format!("2024-06-{d}"), "09:00", "17:00"))
        .collect();
    let candidate = win("2024-06-16", "09:00", "14:00");

    let violation = validate(&candidate, &existing, &cfg, Some(RuleKind::ExceedsWeeklyHours))
        .expect_err("over weekly ceiling");
    assert_eq!(violation.kind, RuleKind::ExceedsWeeklyHours);
    assert!(!violation.overridable);
}

#[test]
fn weekly_totals_reset_across_iso_weeks() {
    let cfg = RuleConfig::default();
    // 40h in the week of Jun 10; the following Monday starts a fresh week.
    let existing: Vec<_> = (10..=14)
        .map(|d| win(&format!("2024-06-{d}"), "09:00", "17:00"))
        .collect();
    let candidate = win("2024-06-17", "09:00", "17:00");

    assert!(validate(&candidate, &existing, &cfg, None).is_ok());
}

// --- INSUFFICIENT_REST ---------------------------------------------------------

#[test]
fn short_gap_after_previous_assignment() {
    let cfg = RuleConfig::default();
    // 4h + 4h keeps daily hours under the cap, isolating the 5h rest gap.
    let existing = vec![win("2024-06-10", "09:00", "13:00")];
    let candidate = win("2024-06-10", "18:00", "22:00");

    let violation = validate(&candidate, &existing, &cfg, None).expect_err("too little rest");
    assert_eq!(violation.kind, RuleKind::InsufficientRest);
    assert!(violation.overridable);
}

#[test]
fn short_gap_before_next_assignment() {
    let cfg = RuleConfig::default();
    let existing = vec![win("2024-06-11", "06:00", "10:00")];
    let candidate = win("2024-06-10", "18:00", "22:00");

    let violation = validate(&candidate, &existing, &cfg, None).expect_err("too little rest");
    assert_eq!(violation.kind, RuleKind::InsufficientRest);
    assert!(violation.overridable);
}

#[test]
fn eleven_hour_gap_is_enough() {
    let cfg = RuleConfig::default();
    // Ends 20:00, next starts 07:00 the following day: exactly 11h.
    let existing = vec![win("2024-06-10", "16:00", "20:00")];
    let candidate = win("2024-06-11", "07:00", "11:00");

    // 07:00 start is within the opening cutoff but the prior shift is no closing
    // shift, so the pattern rule stays quiet too.
    assert!(validate(&candidate, &existing, &cfg, None).is_ok());
}

#[test]
fn rest_waiver_skips_the_gap_check() {
    let cfg = RuleConfig::default();
    let existing = vec![win("2024-06-10", "09:00", "13:00")];
    let candidate = win("2024-06-10", "18:00", "22:00");

    assert!(validate(&candidate, &existing, &cfg, Some(RuleKind::InsufficientRest)).is_ok());
}

// --- shift-count, consecutive-day and weekend caps -----------------------------

#[test]
fn third_shift_of_the_day_breaches_the_count_cap() {
    let cfg = RuleConfig::default();
    // Rest outranks the count rules, so only a rest waiver exposes the count cap:
    // three short shifts can never share a day with 11h gaps between them.
    let existing = vec![
        win("2024-06-10", "00:00", "01:00"),
        win("2024-06-10", "12:30", "13:30"),
    ];
    let candidate = win("2024-06-10", "23:00", "23:30");

    let violation = validate(&candidate, &existing, &cfg, Some(RuleKind::InsufficientRest))
        .expect_err("three shifts in one day");
    assert_eq!(violation.kind, RuleKind::ExceedsDailyShifts);
    assert!(violation.overridable);
}

#[test]
fn seventh_shift_of_the_week_breaches_the_weekly_count() {
    let cfg = RuleConfig::default();
    // Six 2h shifts Mon-Sat, candidate on Sunday makes seven in the ISO week.
    let existing: Vec<_> = (10..=15)
        .map(|d| win(&format!("2024-06-{d}"), "09:00", "11:00"))
        .collect();
    let candidate = win("2024-06-16", "09:00", "11:00");

    let violation = validate(&candidate, &existing, &cfg, None).expect_err("seven in a week");
    assert_eq!(violation.kind, RuleKind::ExceedsWeeklyShifts);
    assert!(violation.overridable);
}

#[test]
fn seventh_consecutive_day_breaches_the_run_cap() {
    let cfg = RuleConfig::default();
    // Thu-Tue spanning two ISO weeks keeps the weekly counts legal; the Wednesday
    // candidate closes a run of seven days.
    let existing = vec![
        win("2024-06-06", "09:00", "11:00"),
        win("2024-06-07", "09:00", "11:00"),
        win("2024-06-08", "09:00", "11:00"),
        win("2024-06-09", "09:00", "11:00"),
        win("2024-06-10", "09:00", "11:00"),
        win("2024-06-11", "09:00", "11:00"),
    ];
    let candidate = win("2024-06-12", "09:00", "11:00");

    let violation = validate(&candidate, &existing, &cfg, None).expect_err("seven-day run");
    assert_eq!(violation.kind, RuleKind::ExceedsConsecutiveDays);
    assert!(violation.overridable);
}

#[test]
fn run_counts_days_on_both_sides_of_the_candidate() {
    let cfg = RuleConfig::default();
    // Thu-Sat and Mon-Wed across two ISO weeks, so neither weekly count trips.
    let existing = vec![
        win("2024-06-13", "09:00", "11:00"),
        win("2024-06-14", "09:00", "11:00"),
        win("2024-06-15", "09:00", "11:00"),
        win("2024-06-17", "09:00", "11:00"),
        win("2024-06-18", "09:00", "11:00"),
        win("2024-06-19", "09:00", "11:00"),
    ];
    // Filling the Sunday hole joins the two runs into seven days.
    let candidate = win("2024-06-16", "09:00", "11:00");

    let violation = validate(&candidate, &existing, &cfg, None).expect_err("joined run");
    assert_eq!(violation.kind, RuleKind::ExceedsConsecutiveDays);
}

#[test]
fn fifth_weekend_shift_of_the_month_breaches_the_weekend_cap() {
    let cfg = RuleConfig::default();
    // June 2024: Sat 1, Sun 2, Sat 8, Sun 9 worked; Sat 15 is the fifth.
    let existing = vec![
        win("2024-06-01", "09:00", "11:00"),
        win("2024-06-02", "09:00", "11:00"),
        win("2024-06-08", "09:00", "11:00"),
        win("2024-06-09", "09:00", "11:00"),
    ];
    let candidate = win("2024-06-15", "09:00", "11:00");

    let violation = validate(&candidate, &existing, &cfg, None).expect_err("fifth weekend day");
    assert_eq!(violation.kind, RuleKind::ExceedsWeekendLimit);
    assert!(violation.overridable);
}

#[test]
fn weekday_candidate_ignores_the_weekend_cap() {
    let cfg = RuleConfig::default();
    let existing = vec![
        win("2024-06-01", "09:00", "11:00"),
        win("2024-06-02", "09:00", "11:00"),
        win("2024-06-08", "09:00", "11:00"),
        win("2024-06-09", "09:00", "11:00"),
    ];
    let candidate = win("2024-06-12", "09:00", "11:00");

    assert!(validate(&candidate, &existing, &cfg, None).is_ok());
}

// --- PATTERN_RESTRICTED --------------------------------------------------------

#[test]
fn closing_then_opening_is_hard() {
    let cfg = RuleConfig::default();
    // Ends exactly at the closing cutoff; candidate opens at the opening cutoff
    // next day. The 11h gap satisfies rest, so the pattern rule is what fires.
    let existing = vec![win("2024-06-10", "13:00", "21:00")];
    let candidate = win("2024-06-11", "08:00", "12:00");

    let violation = validate(&candidate, &existing, &cfg, None).expect_err("close into open");
    assert_eq!(violation.kind, RuleKind::PatternRestricted);
    assert!(!violation.overridable);

    // Sanctioned overtime does not unlock it either.
    let violation = validate_overtime(&candidate, &existing, &cfg).expect_err("still blocked");
    assert_eq!(violation.kind, RuleKind::PatternRestricted);
}

#[test]
fn candidate_closing_before_an_existing_opening_is_blocked_too() {
    let cfg = RuleConfig::default();
    let existing = vec![win("2024-06-12", "08:00", "12:00")];
    let candidate = win("2024-06-11", "13:00", "21:00");

    let violation = validate(&candidate, &existing, &cfg, None).expect_err("close into open");
    assert_eq!(violation.kind, RuleKind::PatternRestricted);
}

#[test]
fn closing_then_late_start_is_allowed() {
    let cfg = RuleConfig::default();
    let existing = vec![win("2024-06-10", "13:00", "21:00")];
    let candidate = win("2024-06-11", "12:00", "16:00");

    assert!(validate(&candidate, &existing, &cfg, None).is_ok());
}

// --- precedence and overtime mode ----------------------------------------------

#[test]
fn first_breach_in_precedence_order_wins() {
    let cfg = RuleConfig::default();
    // Both daily hours (12h total) and rest (1h gap) are breached; daily hours
    // ranks higher and is the one reported.
    let existing = vec![win("2024-06-10", "09:00", "17:00")];
    let candidate = win("2024-06-10", "18:00", "22:00");

    assert_eq!(
        kind_of(validate(&candidate, &existing, &cfg, None)),
        RuleKind::ExceedsDailyHours
    );
}

#[test]
fn overtime_mode_bypasses_soft_rules_and_reports_them() {
    let cfg = RuleConfig::default();
    let existing = vec![win("2024-06-10", "09:00", "17:00")];
    let candidate = win("2024-06-10", "18:00", "22:00");

    let bypassed = validate_overtime(&candidate, &existing, &cfg).expect("sanctioned overtime");
    assert!(bypassed.contains(&RuleKind::ExceedsDailyHours));
    assert!(bypassed.contains(&RuleKind::InsufficientRest));
}

#[test]
fn overtime_mode_reports_nothing_for_a_clean_schedule() {
    let cfg = RuleConfig::default();
    let existing = vec![win("2024-06-10", "09:00", "13:00")];
    let candidate = win("2024-06-12", "09:00", "13:00");

    let bypassed = validate_overtime(&candidate, &existing, &cfg).expect("clean schedule");
    assert_eq!(bypassed, Vec::<RuleKind>::new());
}

#[test]
fn empty_schedule_accepts_any_reasonable_candidate() {
    let cfg = RuleConfig::default();
    let candidate = win("2024-06-10", "09:00", "17:00");

    assert!(validate(&candidate, &[], &cfg, None).is_ok());
}

#[test]
fn rule_kind_round_trips_through_strings() {
    for kind in [
        RuleKind::TimeConflict,
        RuleKind::ExceedsDailyHours,
        RuleKind::ExceedsWeeklyHours,
        RuleKind::InsufficientRest,
        RuleKind::ExceedsDailyShifts,
        RuleKind::ExceedsWeeklyShifts,
        RuleKind::ExceedsConsecutiveDays,
        RuleKind::ExceedsWeekendLimit,
        RuleKind::PatternRestricted,
    ] {
        let parsed: RuleKind = kind.to_string().parse().expect("round trip");
        assert_eq!(parsed, kind);
    }
}
