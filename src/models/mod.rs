// src/models/mod.rs

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::rota::{
    self,
    model::{JobRole as DomainJobRole, RoleMapping as DomainRoleMapping, ShiftRule as DomainShiftRule, TroughPeriod as DomainTroughPeriod},
    ranking::StaffEvaluation as DomainEvaluation,
    EmploymentType, WageTargetType,
};

fn days(raw: &[i32]) -> Vec<u32> {
    raw.iter()
        .filter_map(|d| u32::try_from(*d).ok())
        .filter(|d| *d < 7)
        .collect()
}

// ───────────────────────────────────────
// Reference data (read-only to the scheduler)
// ───────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRole {
    pub job_role_id: i64,
    pub location_id: i64,
    pub title: String,
    pub is_kitchen: bool,
    pub default_wage_rate: f64,
}

impl From<JobRole> for DomainJobRole {
    fn from(r: JobRole) -> Self {
        Self {
            id: r.job_role_id,
            title: r.title,
            is_kitchen: r.is_kitchen,
            default_wage_rate: r.default_wage_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoleMapping {
    pub role_mapping_id: i64,
    pub location_id: i64,
    pub job_title: String,
    pub job_role_id: i64,
}

impl From<RoleMapping> for DomainRoleMapping {
    fn from(m: RoleMapping) -> Self {
        Self {
            job_title: m.job_title,
            job_role_id: m.job_role_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShiftRule {
    pub shift_rule_id: i64,
    pub location_id: i64,
    pub job_role_id: i64,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub days_of_week: Vec<i32>,   // int[] 0=Sun..6=Sat
    pub min_staff: i32,
    pub archived: bool,
}

impl From<ShiftRule> for DomainShiftRule {
    fn from(r: ShiftRule) -> Self {
        Self {
            id: r.shift_rule_id,
            job_role_id: r.job_role_id,
            start_time: r.start_time,
            end_time: r.end_time,
            days_of_week: days(&r.days_of_week),
            min_staff: u32::try_from(r.min_staff).unwrap_or(0),
            archived: r.archived,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TroughPeriod {
    pub trough_period_id: i64,
    pub location_id: i64,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub days_of_week: Vec<i32>,
}

impl From<TroughPeriod> for DomainTroughPeriod {
    fn from(t: TroughPeriod) -> Self {
        Self {
            start_time: t.start_time,
            end_time: t.end_time,
            days_of_week: days(&t.days_of_week),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Staff {
    pub staff_id: i64,
    pub location_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub job_title: Option<String>,
    pub job_role_ids: Vec<i64>,               // bigint[]
    pub employment_type: String,              // hourly|salaried|contractor
    pub wage_rate: Option<f64>,
    pub annual_salary: Option<f64>,
    pub contractor_rate: Option<f64>,
    pub is_full_time_student: bool,
    pub available_for_rota: bool,
    pub unavailable_dates: Vec<NaiveDate>,    // date[]
}

impl Staff {
    /// `hi_score` comes from the evaluation history, not the staff row.
    pub fn into_domain(self, hi_score: f64) -> rota::StaffMember {
        rota::StaffMember {
            id: self.staff_id,
            first_name: self.first_name,
            last_name: self.last_name,
            job_title: self.job_title,
            job_role_ids: self.job_role_ids,
            employment_type: EmploymentType::from(self.employment_type.as_str()),
            wage_rate: self.wage_rate,
            annual_salary: self.annual_salary,
            contractor_rate: self.contractor_rate,
            is_full_time_student: self.is_full_time_student,
            available_for_rota: self.available_for_rota,
            hi_score,
            unavailable_dates: self.unavailable_dates.into_iter().collect::<BTreeSet<_>>(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StaffEvaluation {
    pub staff_id: i64,
    pub weighted_score: f64,
}

impl From<StaffEvaluation> for DomainEvaluation {
    fn from(e: StaffEvaluation) -> Self {
        Self {
            staff_id: e.staff_id,
            weighted_score: e.weighted_score,
        }
    }
}

// ───────────────────────────────────────
// Per-location configuration
// ───────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GlobalRules {
    pub location_id: i64,
    pub wage_target_type: String,             // percent|absolute|hours
    pub wage_target_value: f64,
    pub max_shifts_per_week: i32,
    pub min_rest_hours_between_shifts: f64,
    pub max_consecutive_days_worked: i32,
    pub updated_at: DateTime<Utc>,
}

impl GlobalRules {
    pub fn to_constraints(&self) -> Result<rota::GlobalConstraints, String> {
        let count = |name: &str, v: i32| {
            u32::try_from(v).map_err(|_| format!("{name} must be non-negative, got {v}"))
        };
        Ok(rota::GlobalConstraints {
            wage_target_type: self.wage_target_type.parse::<WageTargetType>()?,
            wage_target_value: self.wage_target_value,
            max_shifts_per_week: count("max_shifts_per_week", self.max_shifts_per_week)?,
            min_rest_hours_between_shifts: self.min_rest_hours_between_shifts,
            max_consecutive_days_worked: count(
                "max_consecutive_days_worked",
                self.max_consecutive_days_worked,
            )?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AlgorithmSettings {
    pub location_id: i64,
    pub salaried_weight: f64,
    pub manager_weight: f64,
    pub hi_score_weight: f64,
    pub enable_part_shifts: bool,
    pub min_part_shift_hours: f64,
    pub max_part_shift_hours: f64,
    pub updated_at: DateTime<Utc>,
}

impl From<&AlgorithmSettings> for rota::AlgorithmConfig {
    fn from(s: &AlgorithmSettings) -> Self {
        Self {
            salaried_weight: s.salaried_weight,
            manager_weight: s.manager_weight,
            hi_score_weight: s.hi_score_weight,
            enable_part_shifts: s.enable_part_shifts,
            min_part_shift_hours: s.min_part_shift_hours,
            max_part_shift_hours: s.max_part_shift_hours,
        }
    }
}

// ───────────────────────────────────────
// Requests, schedules, shifts
// ───────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RotaRequest {
    pub rota_request_id: i64,
    pub location_id: i64,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub status: String,                        // draft|generated
    pub requested_by: Option<i64>,
    pub revenue_forecast: Json<BTreeMap<NaiveDate, f64>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RotaSchedule {
    pub rota_schedule_id: i64,
    pub rota_request_id: i64,
    pub location_id: i64,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub status: String,                        // draft|published
    pub total_cost: f64,
    pub revenue_forecast: f64,
    pub cost_percentage: f64,
    pub unfilled_shifts: i32,
    pub input_hash: String,                    // SHA256 hex
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScheduledShift {
    pub shift_id: i64,
    pub rota_schedule_id: i64,
    pub staff_id: Option<i64>,
    pub job_role_id: i64,
    pub shift_rule_id: Option<i64>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub hours: f64,
    pub is_part_shift: bool,
    pub basic_pay: f64,
    pub ni_cost: f64,
    pub pension_cost: f64,
    pub total_cost: f64,
}

// ───────────────────────────────────────
// Write-side DTOs
// ───────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRotaRequest {
    pub location_id: i64,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub requested_by: Option<i64>,
    pub revenue_forecast: BTreeMap<NaiveDate, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRotaSchedule {
    pub rota_request_id: i64,
    pub location_id: i64,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub total_cost: f64,
    pub revenue_forecast: f64,
    pub cost_percentage: f64,
    pub unfilled_shifts: i32,
    pub input_hash: String,
    pub created_by: Option<i64>,
    /// Written back to the request when the schedule commits.
    pub daily_forecast: BTreeMap<NaiveDate, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewShift {
    pub staff_id: Option<i64>,
    pub job_role_id: i64,
    pub shift_rule_id: Option<i64>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub hours: f64,
    pub is_part_shift: bool,
    pub basic_pay: f64,
    pub ni_cost: f64,
    pub pension_cost: f64,
    pub total_cost: f64,
}

impl From<&rota::PlannedShift> for NewShift {
    fn from(s: &rota::PlannedShift) -> Self {
        Self {
            staff_id: s.staff_id,
            job_role_id: s.job_role_id,
            shift_rule_id: Some(s.shift_rule_id),
            date: s.date,
            start_time: s.start_time,
            end_time: s.end_time,
            hours: s.hours,
            is_part_shift: s.is_part_shift,
            basic_pay: s.cost.basic_pay,
            ni_cost: s.cost.ni_cost,
            pension_cost: s.cost.pension_cost,
            total_cost: s.cost.total_cost,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutGlobalRules {
    pub wage_target_type: WageTargetType,
    pub wage_target_value: f64,
    pub max_shifts_per_week: u32,
    pub min_rest_hours_between_shifts: f64,
    pub max_consecutive_days_worked: u32,
}

impl From<&PutGlobalRules> for rota::GlobalConstraints {
    fn from(p: &PutGlobalRules) -> Self {
        Self {
            wage_target_type: p.wage_target_type,
            wage_target_value: p.wage_target_value,
            max_shifts_per_week: p.max_shifts_per_week,
            min_rest_hours_between_shifts: p.min_rest_hours_between_shifts,
            max_consecutive_days_worked: p.max_consecutive_days_worked,
        }
    }
}

/// Summary handed back to the caller after a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub rota_request_id: i64,
    pub rota_schedule_id: i64,
    pub run_id: uuid::Uuid,
    pub shift_count: usize,
    pub assigned_count: usize,
    pub unfilled_count: usize,
    pub suppressed_count: usize,
    pub total_cost: f64,
    pub revenue_forecast: f64,
    pub cost_percentage: f64,
    pub wage_target: rota::model::WageTargetReport,
    pub input_hash: String,
}
