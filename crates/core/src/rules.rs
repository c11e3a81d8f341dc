//! # Labor Law Rule Engine
//!
//! Pure validation of a candidate shift against a staff member's existing schedule.
//! Rules are evaluated in a fixed precedence order and the first breach is returned,
//! so staff resolve one rule at a time. Each violation carries an `overridable` flag:
//! soft rules can be waived by an approved overtime request (up to their own hard
//! ceiling), hard rules can never be waived.
//!
//! The engine never touches storage. Callers load the staff member's active
//! scheduled blocks, pass them in, and commit only on `Ok`.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// The typed rule identifiers, in evaluation precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleKind {
    TimeConflict,
    ExceedsDailyHours,
    ExceedsWeeklyHours,
    InsufficientRest,
    ExceedsDailyShifts,
    ExceedsWeeklyShifts,
    ExceedsConsecutiveDays,
    ExceedsWeekendLimit,
    PatternRestricted,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RuleKind::TimeConflict => "TIME_CONFLICT",
            RuleKind::ExceedsDailyHours => "EXCEEDS_DAILY_HOURS",
            RuleKind::ExceedsWeeklyHours => "EXCEEDS_WEEKLY_HOURS",
            RuleKind::InsufficientRest => "INSUFFICIENT_REST",
            RuleKind::ExceedsDailyShifts => "EXCEEDS_DAILY_SHIFTS",
            RuleKind::ExceedsWeeklyShifts => "EXCEEDS_WEEKLY_SHIFTS",
            RuleKind::ExceedsConsecutiveDays => "EXCEEDS_CONSECUTIVE_DAYS",
            RuleKind::ExceedsWeekendLimit => "EXCEEDS_WEEKEND_LIMIT",
            RuleKind::PatternRestricted => "PATTERN_RESTRICTED",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for RuleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TIME_CONFLICT" => Ok(RuleKind::TimeConflict),
            "EXCEEDS_DAILY_HOURS" => Ok(RuleKind::ExceedsDailyHours),
            "EXCEEDS_WEEKLY_HOURS" => Ok(RuleKind::ExceedsWeeklyHours),
            "INSUFFICIENT_REST" => Ok(RuleKind::InsufficientRest),
            "EXCEEDS_DAILY_SHIFTS" => Ok(RuleKind::ExceedsDailyShifts),
            "EXCEEDS_WEEKLY_SHIFTS" => Ok(RuleKind::ExceedsWeeklyShifts),
            "EXCEEDS_CONSECUTIVE_DAYS" => Ok(RuleKind::ExceedsConsecutiveDays),
            "EXCEEDS_WEEKEND_LIMIT" => Ok(RuleKind::ExceedsWeekendLimit),
            "PATTERN_RESTRICTED" => Ok(RuleKind::PatternRestricted),
            _ => Err(format!("Unknown rule kind: {}", s)),
        }
    }
}

/// A rule breach reported by [`validate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub kind: RuleKind,
    pub detail: String,
    /// Whether an approved overtime request can waive this breach.
    pub overridable: bool,
}

impl Violation {
    fn hard(kind: RuleKind, detail: String) -> Self {
        Violation { kind, detail, overridable: false }
    }

    fn soft(kind: RuleKind, detail: String) -> Self {
        Violation { kind, detail, overridable: true }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)
    }
}

/// Caps for the rule engine, in minutes where applicable. Defaults follow the
/// statutory baseline; all are overridable through the API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    pub max_daily_minutes: i64,
    pub max_daily_overtime_minutes: i64,
    pub max_weekly_minutes: i64,
    pub max_weekly_overtime_minutes: i64,
    pub min_rest_minutes: i64,
    pub max_daily_shifts: usize,
    pub max_weekly_shifts: usize,
    pub max_consecutive_days: usize,
    /// Weekend shifts allowed per calendar month.
    pub max_weekend_shifts: usize,
    /// A shift ending at or after this time counts as a closing shift.
    pub closing_cutoff: NaiveTime,
    /// A shift starting at or before this time counts as an opening shift.
    pub opening_cutoff: NaiveTime,
}

impl Default for RuleConfig {
    fn default() -> Self {
        RuleConfig {
            max_daily_minutes: 8 * 60,
            max_daily_overtime_minutes: 12 * 60,
            max_weekly_minutes: 40 * 60,
            max_weekly_overtime_minutes: 52 * 60,
            min_rest_minutes: 11 * 60,
            max_daily_shifts: 2,
            max_weekly_shifts: 6,
            max_consecutive_days: 6,
            max_weekend_shifts: 4,
            closing_cutoff: NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
            opening_cutoff: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        }
    }
}

/// A dated working window: either the candidate shift or one of the staff member's
/// existing active assignments. Windows never cross midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftWindow {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl ShiftWindow {
    pub fn new(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        ShiftWindow { date, start_time, end_time }
    }

    pub fn start_dt(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    pub fn end_dt(&self) -> NaiveDateTime {
        self.date.and_time(self.end_time)
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_dt() - self.start_dt()).num_minutes()
    }

    /// Half-open overlap test on the same date.
    pub fn overlaps(&self, other: &ShiftWindow) -> bool {
        self.date == other.date
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.date.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

fn fmt_minutes(minutes: i64) -> String {
    format!("{}h{:02}m", minutes / 60, minutes % 60)
}

fn same_iso_week(a: NaiveDate, b: NaiveDate) -> bool {
    let (aw, bw) = (a.iso_week(), b.iso_week());
    aw.year() == bw.year() && aw.week() == bw.week()
}

fn waives(waived: Option<RuleKind>, kind: RuleKind) -> bool {
    waived == Some(kind)
}

/// Validates `candidate` against the staff member's existing active blocks.
///
/// `waived` names the single soft rule an approved overtime request has waived for
/// this registration; its hard ceiling (where one exists) still applies, and
/// TIME_CONFLICT / PATTERN_RESTRICTED ignore waivers entirely.
///
/// Returns the first violation in precedence order, or `Ok(())`.
pub fn validate(
    candidate: &ShiftWindow,
    existing: &[ShiftWindow],
    cfg: &RuleConfig,
    waived: Option<RuleKind>,
) -> Result<(), Violation> {
    check_time_conflict(candidate, existing)?;
    check_daily_hours(candidate, existing, cfg, waived)?;
    check_weekly_hours(candidate, existing, cfg, waived)?;
    check_rest(candidate, existing, cfg, waived)?;
    check_shift_counts(candidate, existing, cfg, waived)?;
    check_consecutive_days(candidate, existing, cfg, waived)?;
    check_weekend_limit(candidate, existing, cfg, waived)?;
    check_pattern(candidate, existing, cfg)?;
    Ok(())
}

/// Validation for a sanctioned overtime registration (an approved OVERTIME request
/// replaying the blocked registration). Soft rules are waived wholesale — the
/// approval covers them — but hard rules and the overtime ceilings still apply.
///
/// On success returns the soft rules that were bypassed, so the caller can record
/// waivers (e.g. mark the assignment `rest_waived` when INSUFFICIENT_REST was among
/// them).
pub fn validate_overtime(
    candidate: &ShiftWindow,
    existing: &[ShiftWindow],
    cfg: &RuleConfig,
) -> Result<Vec<RuleKind>, Violation> {
    check_time_conflict(candidate, existing)?;
    check_daily_hours(candidate, existing, cfg, Some(RuleKind::ExceedsDailyHours))?;
    check_weekly_hours(candidate, existing, cfg, Some(RuleKind::ExceedsWeeklyHours))?;
    check_pattern(candidate, existing, cfg)?;

    let mut bypassed = Vec::new();
    let soft_outcomes = [
        check_daily_hours(candidate, existing, cfg, None),
        check_weekly_hours(candidate, existing, cfg, None),
        check_rest(candidate, existing, cfg, None),
        check_shift_counts(candidate, existing, cfg, None),
        check_consecutive_days(candidate, existing, cfg, None),
        check_weekend_limit(candidate, existing, cfg, None),
    ];
    for outcome in soft_outcomes {
        if let Err(v) = outcome {
            if v.overridable {
                bypassed.push(v.kind);
            }
        }
    }
    Ok(bypassed)
}

fn check_time_conflict(
    candidate: &ShiftWindow,
    existing: &[ShiftWindow],
) -> Result<(), Violation> {
    if let Some(other) = existing.iter().find(|e| e.overlaps(candidate)) {
        return Err(Violation::hard(
            RuleKind::TimeConflict,
            format!(
                "candidate {}-{} on {} overlaps an existing assignment {}-{}",
                candidate.start_time.format("%H:%M"),
                candidate.end_time.format("%H:%M"),
                candidate.date,
                other.start_time.format("%H:%M"),
                other.end_time.format("%H:%M"),
            ),
        ));
    }
    Ok(())
}

fn check_daily_hours(
    candidate: &ShiftWindow,
    existing: &[ShiftWindow],
    cfg: &RuleConfig,
    waived: Option<RuleKind>,
) -> Result<(), Violation> {
    let total: i64 = existing
        .iter()
        .filter(|e| e.date == candidate.date)
        .map(ShiftWindow::duration_minutes)
        .sum::<i64>()
        + candidate.duration_minutes();

    if total > cfg.max_daily_overtime_minutes {
        return Err(Violation::hard(
            RuleKind::ExceedsDailyHours,
            format!(
                "daily total {} exceeds the overtime ceiling of {}",
                fmt_minutes(total),
                fmt_minutes(cfg.max_daily_overtime_minutes),
            ),
        ));
    }
    if total > cfg.max_daily_minutes && !waives(waived, RuleKind::ExceedsDailyHours) {
        return Err(Violation::soft(
            RuleKind::ExceedsDailyHours,
            format!(
                "daily total {} exceeds the {} cap",
                fmt_minutes(total),
                fmt_minutes(cfg.max_daily_minutes),
            ),
        ));
    }
    Ok(())
}

fn check_weekly_hours(
    candidate: &ShiftWindow,
    existing: &[ShiftWindow],
    cfg: &RuleConfig,
    waived: Option<RuleKind>,
) -> Result<(), Violation> {
    let total: i64 = existing
        .iter()
        .filter(|e| same_iso_week(e.date, candidate.date))
        .map(ShiftWindow::duration_minutes)
        .sum::<i64>()
        + candidate.duration_minutes();

    if total > cfg.max_weekly_overtime_minutes {
        return Err(Violation::hard(
            RuleKind::ExceedsWeeklyHours,
            format!(
                "weekly total {} exceeds the overtime ceiling of {}",
                fmt_minutes(total),
                fmt_minutes(cfg.max_weekly_overtime_minutes),
            ),
        ));
    }
    if total > cfg.max_weekly_minutes && !waives(waived, RuleKind::ExceedsWeeklyHours) {
        return Err(Violation::soft(
            RuleKind::ExceedsWeeklyHours,
            format!(
                "weekly total {} exceeds the {} cap",
                fmt_minutes(total),
                fmt_minutes(cfg.max_weekly_minutes),
            ),
        ));
    }
    Ok(())
}

fn check_rest(
    candidate: &ShiftWindow,
    existing: &[ShiftWindow],
    cfg: &RuleConfig,
    waived: Option<RuleKind>,
) -> Result<(), Violation> {
    if waives(waived, RuleKind::InsufficientRest) {
        return Ok(());
    }

    // Nearest neighbor on each side by end/start datetime.
    let prev_end = existing
        .iter()
        .map(ShiftWindow::end_dt)
        .filter(|end| *end <= candidate.start_dt())
        .max();
    let next_start = existing
        .iter()
        .map(ShiftWindow::start_dt)
        .filter(|start| *start >= candidate.end_dt())
        .min();

    if let Some(prev_end) = prev_end {
        let gap = (candidate.start_dt() - prev_end).num_minutes();
        if gap < cfg.min_rest_minutes {
            return Err(Violation::soft(
                RuleKind::InsufficientRest,
                format!(
                    "only {} rest after the previous assignment, minimum is {}",
                    fmt_minutes(gap),
                    fmt_minutes(cfg.min_rest_minutes),
                ),
            ));
        }
    }
    if let Some(next_start) = next_start {
        let gap = (next_start - candidate.end_dt()).num_minutes();
        if gap < cfg.min_rest_minutes {
            return Err(Violation::soft(
                RuleKind::InsufficientRest,
                format!(
                    "only {} rest before the next assignment, minimum is {}",
                    fmt_minutes(gap),
                    fmt_minutes(cfg.min_rest_minutes),
                ),
            ));
        }
    }
    Ok(())
}

fn check_shift_counts(
    candidate: &ShiftWindow,
    existing: &[ShiftWindow],
    cfg: &RuleConfig,
    waived: Option<RuleKind>,
) -> Result<(), Violation> {
    let daily = existing.iter().filter(|e| e.date == candidate.date).count() + 1;
    if daily > cfg.max_daily_shifts && !waives(waived, RuleKind::ExceedsDailyShifts) {
        return Err(Violation::soft(
            RuleKind::ExceedsDailyShifts,
            format!(
                "{} shifts on {} exceeds the daily limit of {}",
                daily, candidate.date, cfg.max_daily_shifts,
            ),
        ));
    }

    let weekly = existing
        .iter()
        .filter(|e| same_iso_week(e.date, candidate.date))
        .count()
        + 1;
    if weekly > cfg.max_weekly_shifts && !waives(waived, RuleKind::ExceedsWeeklyShifts) {
        return Err(Violation::soft(
            RuleKind::ExceedsWeeklyShifts,
            format!(
                "{} shifts in the week of {} exceeds the weekly limit of {}",
                weekly, candidate.date, cfg.max_weekly_shifts,
            ),
        ));
    }
    Ok(())
}

fn check_consecutive_days(
    candidate: &ShiftWindow,
    existing: &[ShiftWindow],
    cfg: &RuleConfig,
    waived: Option<RuleKind>,
) -> Result<(), Violation> {
    if waives(waived, RuleKind::ExceedsConsecutiveDays) {
        return Ok(());
    }

    let worked: HashSet<NaiveDate> = existing
        .iter()
        .map(|e| e.date)
        .chain(std::iter::once(candidate.date))
        .collect();

    let mut run = 1usize;
    let mut day = candidate.date;
    while let Some(prev) = day.pred_opt() {
        if !worked.contains(&prev) {
            break;
        }
        run += 1;
        day = prev;
    }
    let mut day = candidate.date;
    while let Some(next) = day.succ_opt() {
        if !worked.contains(&next) {
            break;
        }
        run += 1;
        day = next;
    }

    if run > cfg.max_consecutive_days {
        return Err(Violation::soft(
            RuleKind::ExceedsConsecutiveDays,
            format!(
                "would extend a run of working days to {}, limit is {}",
                run, cfg.max_consecutive_days,
            ),
        ));
    }
    Ok(())
}

fn check_weekend_limit(
    candidate: &ShiftWindow,
    existing: &[ShiftWindow],
    cfg: &RuleConfig,
    waived: Option<RuleKind>,
) -> Result<(), Violation> {
    if !candidate.is_weekend() || waives(waived, RuleKind::ExceedsWeekendLimit) {
        return Ok(());
    }

    let count = existing
        .iter()
        .filter(|e| {
            e.is_weekend()
                && e.date.year() == candidate.date.year()
                && e.date.month() == candidate.date.month()
        })
        .count()
        + 1;

    if count > cfg.max_weekend_shifts {
        return Err(Violation::soft(
            RuleKind::ExceedsWeekendLimit,
            format!(
                "{} weekend shifts in {}-{:02} exceeds the limit of {}",
                count,
                candidate.date.year(),
                candidate.date.month(),
                cfg.max_weekend_shifts,
            ),
        ));
    }
    Ok(())
}

fn check_pattern(
    candidate: &ShiftWindow,
    existing: &[ShiftWindow],
    cfg: &RuleConfig,
) -> Result<(), Violation> {
    let is_closing = |w: &ShiftWindow| w.end_time >= cfg.closing_cutoff;
    let is_opening = |w: &ShiftWindow| w.start_time <= cfg.opening_cutoff;

    // Closing the night before an opening, in either direction.
    let opens_after_close = is_opening(candidate)
        && candidate
            .date
            .pred_opt()
            .is_some_and(|prev| existing.iter().any(|e| e.date == prev && is_closing(e)));
    let closes_before_open = is_closing(candidate)
        && candidate
            .date
            .succ_opt()
            .is_some_and(|next| existing.iter().any(|e| e.date == next && is_opening(e)));

    if opens_after_close || closes_before_open {
        return Err(Violation::hard(
            RuleKind::PatternRestricted,
            format!(
                "closing shift immediately followed by an opening shift around {}",
                candidate.date,
            ),
        ));
    }
    Ok(())
}
