use chrono::{Datelike, NaiveDate};
use tracing::warn;

use crate::model::{RuleKind, ScheduleRule, Span};

use super::intervals::{merge_overlapping, subtract_spans};

// ── Rule resolution ──────────────────────────────────────────────

/// Resolve the net availability for one therapist-day, before bookings are
/// overlaid.
///
/// WorkingHours: a specific-date rule OVERRIDES recurring weekday rules for
/// that date. TimeOff: everything ACCUMULATES — recurring and specific-date
/// rules are all subtracted.
///
/// Rules that violate stored-data invariants are skipped with a warning; one
/// bad row never blocks the rest of the computation.
pub fn resolve_daily_windows(rules: &[ScheduleRule], date: NaiveDate) -> Vec<Span> {
    let mut recurring_work: Vec<Span> = Vec::new();
    let mut specific_work: Vec<Span> = Vec::new();
    let mut time_off: Vec<Span> = Vec::new();

    for rule in rules {
        let Some(specific) = applies_on(rule, date) else {
            continue;
        };
        match (rule.kind, specific) {
            (RuleKind::WorkingHours, true) => specific_work.push(rule.span()),
            (RuleKind::WorkingHours, false) => recurring_work.push(rule.span()),
            (RuleKind::TimeOff, _) => time_off.push(rule.span()),
        }
    }

    let mut working = if specific_work.is_empty() {
        recurring_work
    } else {
        specific_work
    };

    working.sort_by_key(|s| s.start);
    let mut free = merge_overlapping(&working);

    if !time_off.is_empty() {
        time_off.sort_by_key(|s| s.start);
        free = subtract_spans(&free, &merge_overlapping(&time_off));
    }

    free
}

/// Whether `rule` is in effect on `date`. `Some(true)` for a specific-date
/// match, `Some(false)` for a recurring weekday match, `None` otherwise
/// (including for rules skipped as malformed).
fn applies_on(rule: &ScheduleRule, date: NaiveDate) -> Option<bool> {
    if !rule.is_active {
        return None;
    }
    if !valid_rule(rule) {
        return None;
    }
    if rule.effective_from.is_some_and(|from| date < from) {
        return None;
    }
    if rule.effective_to.is_some_and(|to| date > to) {
        return None;
    }
    match (rule.day_of_week, rule.specific_date) {
        (None, Some(d)) if d == date => Some(true),
        (Some(w), None) if w == date.weekday() => Some(false),
        _ => None,
    }
}

/// Defensive invariant check for stored rules. The administrative write path
/// enforces these; a row that slips through is logged and skipped.
fn valid_rule(rule: &ScheduleRule) -> bool {
    match (rule.day_of_week, rule.specific_date) {
        (Some(_), Some(_)) => {
            warn!(rule = %rule.id, "skipping rule with both day_of_week and specific_date");
            return false;
        }
        (None, None) => {
            warn!(rule = %rule.id, "skipping rule with no recurrence");
            return false;
        }
        _ => {}
    }
    if rule.start_time >= rule.end_time {
        warn!(
            rule = %rule.id,
            start = %rule.start_time,
            end = %rule.end_time,
            "skipping rule with inverted time range"
        );
        return false;
    }
    if let (Some(from), Some(to)) = (rule.effective_from, rule.effective_to)
        && from > to
    {
        warn!(rule = %rule.id, "skipping rule with inverted effective range");
        return false;
    }
    true
}
