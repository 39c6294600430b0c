// src/rota/demand.rs
//
// Turns shift rules into dated staffing requirements, applying trough periods.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tracing::warn;

use super::config::AlgorithmConfig;
use super::model::{JobRoleId, ShiftRule, TroughPeriod};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// One seat to fill: a role, on a date, over a concrete time window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftRequirement {
    pub date: NaiveDate,
    pub shift_rule_id: i64,
    pub job_role_id: JobRoleId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub is_part_shift: bool,
    pub slot: u32,
}

impl ShiftRequirement {
    pub fn hours(&self) -> f64 {
        (self.end - self.start).num_minutes() as f64 / 60.0
    }

    fn sort_key(&self) -> (NaiveDateTime, NaiveDateTime, JobRoleId, i64, u32) {
        (self.start, self.end, self.job_role_id, self.shift_rule_id, self.slot)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Demand {
    pub requirements: Vec<ShiftRequirement>,
    /// Seats dropped entirely because a trough covered them.
    pub suppressed: usize,
}

fn minute_of_day(t: NaiveTime) -> i64 {
    i64::from(t.num_seconds_from_midnight() / 60)
}

/// Minutes from the start of the day; an end not after the start wraps past midnight.
fn window(start: NaiveTime, end: NaiveTime) -> (i64, i64) {
    let s = minute_of_day(start);
    let mut e = minute_of_day(end);
    if e <= s {
        e += MINUTES_PER_DAY;
    }
    (s, e)
}

fn subtract(segments: Vec<(i64, i64)>, (a, b): (i64, i64)) -> Vec<(i64, i64)> {
    let mut out = Vec::with_capacity(segments.len() + 1);
    for (x, y) in segments {
        if b <= x || a >= y {
            out.push((x, y));
            continue;
        }
        if x < a {
            out.push((x, a));
        }
        if b < y {
            out.push((b, y));
        }
    }
    out
}

/// Trough windows relevant to shifts starting on `date`: the day's own, the
/// tail of the previous day's overnight troughs, and the following day's
/// troughs for shifts that run past midnight.
fn trough_windows(date: NaiveDate, troughs: &[TroughPeriod]) -> Vec<(i64, i64)> {
    let mut out = Vec::new();
    for t in troughs {
        let (s, e) = window(t.start_time, t.end_time);
        if t.applies_on(date) {
            out.push((s, e));
        }
        if e > MINUTES_PER_DAY && date.pred_opt().is_some_and(|prev| t.applies_on(prev)) {
            out.push((s - MINUTES_PER_DAY, e - MINUTES_PER_DAY));
        }
        if date.succ_opt().is_some_and(|next| t.applies_on(next)) {
            out.push((s + MINUTES_PER_DAY, e + MINUTES_PER_DAY));
        }
    }
    out
}

/// Segments of the rule's window to staff on `date`, and whether they are
/// part shifts. An empty result means the trough suppressed the shift.
fn staffed_segments(
    rule: &ShiftRule,
    troughs: &[(i64, i64)],
    config: &AlgorithmConfig,
) -> (Vec<(i64, i64)>, bool) {
    let full = window(rule.start_time, rule.end_time);
    let segments = troughs
        .iter()
        .fold(vec![full], |acc, &t| subtract(acc, t));

    if segments == [full] {
        return (segments, false);
    }

    if config.enable_part_shifts {
        let min = (config.min_part_shift_hours * 60.0).round() as i64;
        let max = (config.max_part_shift_hours * 60.0).round() as i64;
        let parts = segments
            .into_iter()
            .filter(|(x, y)| y - x >= min)
            .map(|(x, y)| (x, y.min(x + max)))
            .collect();
        return (parts, true);
    }

    // Shrink to the longest remaining span; the earliest wins a tie.
    let longest = segments
        .into_iter()
        .fold(None::<(i64, i64)>, |best, seg| match best {
            Some(b) if b.1 - b.0 >= seg.1 - seg.0 => Some(b),
            _ => Some(seg),
        });
    (longest.into_iter().collect(), false)
}

pub fn expand_day(
    date: NaiveDate,
    rules: &[ShiftRule],
    troughs: &[TroughPeriod],
    config: &AlgorithmConfig,
) -> Demand {
    let midnight = date.and_time(NaiveTime::MIN);
    let windows = trough_windows(date, troughs);
    let mut demand = Demand::default();

    for rule in rules.iter().filter(|r| r.applies_on(date)) {
        let (segments, is_part_shift) = staffed_segments(rule, &windows, config);
        if segments.is_empty() {
            demand.suppressed += rule.min_staff as usize;
            continue;
        }
        for (s, e) in segments {
            let at = |m: i64| midnight.checked_add_signed(Duration::minutes(m));
            let (Some(start), Some(end)) = (at(s), at(e)) else {
                // Only reachable at the very end of the calendar.
                warn!(%date, shift_rule_id = rule.id, "shift window out of date range; skipped");
                continue;
            };
            for slot in 0..rule.min_staff {
                demand.requirements.push(ShiftRequirement {
                    date,
                    shift_rule_id: rule.id,
                    job_role_id: rule.job_role_id,
                    start,
                    end,
                    is_part_shift,
                    slot,
                });
            }
        }
    }

    demand.requirements.sort_by_key(ShiftRequirement::sort_key);
    demand
}

/// Requirements for every date, in fill order: start, end, role, rule, slot.
pub fn expand_week(
    dates: impl IntoIterator<Item = NaiveDate>,
    rules: &[ShiftRule],
    troughs: &[TroughPeriod],
    config: &AlgorithmConfig,
) -> Demand {
    let mut week = Demand::default();
    for date in dates {
        let day = expand_day(date, rules, troughs, config);
        week.requirements.extend(day.requirements);
        week.suppressed += day.suppressed;
    }
    week.requirements.sort_by_key(ShiftRequirement::sort_key);
    week
}
