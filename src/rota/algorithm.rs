// src/rota/algorithm.rs

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::config::{AlgorithmConfig, GlobalConstraints, WageTargetType};
use super::constraints::{Rejection, StaffLedger};
use super::cost::{calculate_employer_cost, CostCalculationResult};
use super::demand::{expand_week, ShiftRequirement};
use super::model::{
    GeneratedSchedule, JobRole, JobRoleId, PlannedShift, RoleMapping, ShiftRule, StaffId,
    StaffMember, TroughPeriod, WageTargetReport,
};
use super::ranking::{rank_candidates, RankedCandidate};
use super::roles::RoleCatalog;
use super::AlgorithmError;

/// The location-week being scheduled and its per-day revenue forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RotaWeek {
    pub location_id: i64,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub revenue_forecast: BTreeMap<NaiveDate, f64>,
}

impl RotaWeek {
    pub const MAX_DAYS: i64 = 7;

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.week_start
            .iter_days()
            .take_while(move |d| *d <= self.week_end)
    }

    /// Forecast revenue for days inside the week.
    pub fn revenue_total(&self) -> f64 {
        self.revenue_forecast
            .range(self.week_start..=self.week_end)
            .map(|(_, v)| *v)
            .filter(|v| v.is_finite())
            .sum()
    }

    fn validate(&self) -> Result<(), AlgorithmError> {
        if self.location_id <= 0 {
            return Err(AlgorithmError::MissingLocation);
        }
        let span = (self.week_end - self.week_start).num_days();
        if !(0..Self::MAX_DAYS).contains(&span) {
            return Err(AlgorithmError::InvalidWeek {
                start: self.week_start,
                end: self.week_end,
            });
        }
        Ok(())
    }
}

struct Candidate {
    ranked: RankedCandidate,
    roles: BTreeSet<JobRoleId>,
}

/// Greedy single-pass rota generator for one location-week.
///
/// Requirements are filled in start-time order; each goes to the
/// highest-ranked candidate who holds the role, is available that day, and
/// stays within the weekly shift, rest and consecutive-day limits given
/// everything assigned earlier in the run. Requirements nobody can take are
/// kept with no staff member.
#[derive(Debug, Clone, Serialize)]
pub struct RotaSchedulingAlgorithm {
    week: RotaWeek,
    staff: Vec<StaffMember>,
    job_roles: Vec<JobRole>,
    constraints: GlobalConstraints,
    config: AlgorithmConfig,
    shift_rules: Vec<ShiftRule>,
    trough_periods: Vec<TroughPeriod>,
    role_mappings: Vec<RoleMapping>,
}

impl RotaSchedulingAlgorithm {
    pub fn new(
        week: RotaWeek,
        staff: Vec<StaffMember>,
        job_roles: Vec<JobRole>,
        constraints: GlobalConstraints,
        config: AlgorithmConfig,
    ) -> Self {
        Self {
            week,
            staff,
            job_roles,
            constraints,
            config,
            shift_rules: Vec::new(),
            trough_periods: Vec::new(),
            role_mappings: Vec::new(),
        }
    }

    pub fn set_shift_rules(&mut self, rules: Vec<ShiftRule>) {
        self.shift_rules = rules;
    }

    pub fn set_trough_periods(&mut self, troughs: Vec<TroughPeriod>) {
        self.trough_periods = troughs;
    }

    pub fn set_role_mappings(&mut self, mappings: Vec<RoleMapping>) {
        self.role_mappings = mappings;
    }

    pub fn week(&self) -> &RotaWeek {
        &self.week
    }

    /// SHA-256 of the serialized inputs. Identical inputs give identical
    /// schedules, so equal hashes identify reproducible runs.
    pub fn input_hash(&self) -> Result<String, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }

    fn validate(&self) -> Result<(), AlgorithmError> {
        self.week.validate()?;
        if !self.shift_rules.iter().any(|r| !r.archived) {
            return Err(AlgorithmError::NoShiftRules);
        }
        self.constraints.validate()?;
        self.config.validate()?;
        Ok(())
    }

    pub fn generate_schedule(&self) -> Result<GeneratedSchedule, AlgorithmError> {
        self.validate()?;

        let mut catalog = RoleCatalog::new(&self.job_roles);
        catalog.set_mappings(&self.role_mappings);

        let available: Vec<StaffMember> = self
            .staff
            .iter()
            .filter(|s| s.available_for_rota)
            .cloned()
            .collect();
        let candidates: Vec<Candidate> = rank_candidates(&available, &self.config, &catalog)
            .into_iter()
            .map(|ranked| Candidate {
                roles: catalog.eligible_roles(&ranked.staff),
                ranked,
            })
            .collect();

        let demand = expand_week(
            self.week.dates(),
            &self.shift_rules,
            &self.trough_periods,
            &self.config,
        );
        debug!(
            requirements = demand.requirements.len(),
            suppressed = demand.suppressed,
            candidates = candidates.len(),
            "expanded weekly demand"
        );

        let mut ledgers: BTreeMap<StaffId, StaffLedger> = BTreeMap::new();
        let mut shifts = Vec::with_capacity(demand.requirements.len());
        let mut totals = CostCalculationResult::default();
        let mut total_hours = 0.0;
        let mut unfilled = 0usize;

        for req in &demand.requirements {
            match self.pick(req, &candidates, &ledgers) {
                Some(candidate) => {
                    let staff = &candidate.ranked.staff;
                    ledgers.entry(staff.id).or_default().record(req);

                    let hours = req.hours();
                    let cost = calculate_employer_cost(
                        &staff.cost_input(hours, catalog.default_wage_rate(req.job_role_id)),
                    );
                    totals.accumulate(&cost);
                    total_hours += hours;
                    shifts.push(planned(req, Some(staff.id), cost));
                }
                None => {
                    unfilled += 1;
                    warn!(
                        date = %req.date,
                        start = %req.start.time(),
                        job_role_id = req.job_role_id,
                        "no eligible staff for shift"
                    );
                    shifts.push(planned(req, None, CostCalculationResult::default()));
                }
            }
        }

        let revenue = self.week.revenue_total();
        let cost_percentage = cost_percentage(totals.total_cost, revenue);
        let wage_target = wage_target_report(&self.constraints, totals.total_cost, total_hours, revenue);
        if !wage_target.within_target {
            warn!(
                target_type = wage_target.target_type.as_str(),
                target_value = wage_target.target_value,
                actual = wage_target.actual,
                "generated rota exceeds wage target"
            );
        }

        info!(
            shifts = shifts.len(),
            unfilled,
            total_cost = totals.total_cost,
            cost_percentage,
            "rota generated"
        );

        Ok(GeneratedSchedule {
            shifts,
            total_cost: totals.total_cost,
            total_hours,
            revenue_forecast: revenue,
            cost_percentage,
            unfilled_count: unfilled,
            suppressed_count: demand.suppressed,
            wage_target,
        })
    }

    fn pick<'c>(
        &self,
        req: &ShiftRequirement,
        candidates: &'c [Candidate],
        ledgers: &BTreeMap<StaffId, StaffLedger>,
    ) -> Option<&'c Candidate> {
        candidates.iter().find(|c| {
            let verdict = self.eligibility(req, c, ledgers.get(&c.ranked.staff.id));
            if let Err(reason) = verdict {
                debug!(staff_id = c.ranked.staff.id, date = %req.date, %reason, "candidate skipped");
            }
            verdict.is_ok()
        })
    }

    fn eligibility(
        &self,
        req: &ShiftRequirement,
        candidate: &Candidate,
        ledger: Option<&StaffLedger>,
    ) -> Result<(), Rejection> {
        if !candidate.roles.contains(&req.job_role_id) {
            return Err(Rejection::RoleNotHeld);
        }
        if !candidate.ranked.staff.is_available_on(req.date) {
            return Err(Rejection::Unavailable);
        }
        match ledger {
            Some(l) => l.check(req, &self.constraints),
            None => StaffLedger::default().check(req, &self.constraints),
        }
    }
}

/// Compares the schedule against the location's wage target.
pub fn wage_target_report(
    constraints: &GlobalConstraints,
    total_cost: f64,
    total_hours: f64,
    revenue: f64,
) -> WageTargetReport {
    let target_type = constraints.wage_target_type;
    let target_value = constraints.wage_target_value;
    let (actual, within_target) = match target_type {
        WageTargetType::Percent => {
            let pct = cost_percentage(total_cost, revenue);
            // Any spend against no revenue misses a percentage target.
            let within = if revenue > 0.0 { pct <= target_value } else { total_cost == 0.0 };
            (pct, within)
        }
        WageTargetType::Absolute => (total_cost, total_cost <= target_value),
        WageTargetType::Hours => (total_hours, total_hours <= target_value),
    };
    WageTargetReport {
        target_type,
        target_value,
        actual,
        within_target,
    }
}

impl GeneratedSchedule {
    /// Re-derives the totals from the per-shift costs, e.g. after the shifts
    /// were re-priced by an external calculator.
    pub fn retotal(&mut self, constraints: &GlobalConstraints) {
        self.total_cost = self.shifts.iter().map(|s| s.cost.total_cost).sum();
        self.total_hours = self
            .shifts
            .iter()
            .filter(|s| s.staff_id.is_some())
            .map(|s| s.hours)
            .sum();
        self.unfilled_count = self.shifts.iter().filter(|s| s.staff_id.is_none()).count();
        self.cost_percentage = cost_percentage(self.total_cost, self.revenue_forecast);
        self.wage_target =
            wage_target_report(constraints, self.total_cost, self.total_hours, self.revenue_forecast);
    }
}

/// Labour cost as a percentage of revenue; 0 when there is no revenue.
pub fn cost_percentage(total_cost: f64, revenue: f64) -> f64 {
    if revenue > 0.0 {
        total_cost / revenue * 100.0
    } else {
        0.0
    }
}

fn planned(
    req: &ShiftRequirement,
    staff_id: Option<StaffId>,
    cost: CostCalculationResult,
) -> PlannedShift {
    PlannedShift {
        date: req.date,
        job_role_id: req.job_role_id,
        shift_rule_id: req.shift_rule_id,
        start_time: req.start.time(),
        end_time: req.end.time(),
        hours: req.hours(),
        is_part_shift: req.is_part_shift,
        staff_id,
        cost,
    }
}
