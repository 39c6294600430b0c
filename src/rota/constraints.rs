// src/rota/constraints.rs

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::config::GlobalConstraints;
use super::demand::ShiftRequirement;

/// Why a candidate was passed over for a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rejection {
    RoleNotHeld,
    Unavailable,
    MaxShiftsReached,
    Overlap,
    InsufficientRest,
    TooManyConsecutiveDays,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rejection::RoleNotHeld => "does not hold the job role",
            Rejection::Unavailable => "unavailable",
            Rejection::MaxShiftsReached => "max shifts per week reached",
            Rejection::Overlap => "overlaps an assigned shift",
            Rejection::InsufficientRest => "insufficient rest between shifts",
            Rejection::TooManyConsecutiveDays => "too many consecutive days",
        };
        f.write_str(s)
    }
}

/// What one staff member has been given so far in this run.
#[derive(Debug, Clone, Default)]
pub struct StaffLedger {
    windows: Vec<(NaiveDateTime, NaiveDateTime)>,
    dates: BTreeSet<NaiveDate>,
}

impl StaffLedger {
    pub fn record(&mut self, req: &ShiftRequirement) {
        self.windows.push((req.start, req.end));
        self.dates.insert(req.date);
    }

    /// Hard limits only; role and availability are checked by the caller.
    pub fn check(
        &self,
        req: &ShiftRequirement,
        constraints: &GlobalConstraints,
    ) -> Result<(), Rejection> {
        if self.windows.len() >= constraints.max_shifts_per_week as usize {
            return Err(Rejection::MaxShiftsReached);
        }

        let min_rest =
            Duration::minutes((constraints.min_rest_hours_between_shifts * 60.0).round() as i64);
        for &(start, end) in &self.windows {
            let gap = if end <= req.start {
                req.start - end
            } else if req.end <= start {
                start - req.end
            } else {
                return Err(Rejection::Overlap);
            };
            if gap < min_rest {
                return Err(Rejection::InsufficientRest);
            }
        }

        if self.consecutive_run_with(req.date) > constraints.max_consecutive_days_worked as usize {
            return Err(Rejection::TooManyConsecutiveDays);
        }
        Ok(())
    }

    /// Length of the unbroken run of worked days through `date`, counting `date`.
    fn consecutive_run_with(&self, date: NaiveDate) -> usize {
        let mut run = 1;
        let mut d = date;
        while let Some(prev) = d.pred_opt().filter(|p| self.dates.contains(p)) {
            run += 1;
            d = prev;
        }
        d = date;
        while let Some(next) = d.succ_opt().filter(|n| self.dates.contains(n)) {
            run += 1;
            d = next;
        }
        run
    }
}
