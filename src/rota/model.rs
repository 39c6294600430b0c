// src/rota/model.rs

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::config::WageTargetType;
use super::cost::{CostCalculationResult, CostInput, EmploymentType};

pub type StaffId = i64;
pub type JobRoleId = i64;

/// 0 = Sunday .. 6 = Saturday.
pub fn day_of_week(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

pub(crate) fn norm(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRole {
    pub id: JobRoleId,
    pub title: String,
    pub is_kitchen: bool,
    pub default_wage_rate: f64,
}

impl JobRole {
    pub fn is_manager(&self) -> bool {
        norm(&self.title).contains("manager")
    }
}

/// Resolves a free-text job title to a canonical role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleMapping {
    pub job_title: String,
    pub job_role_id: JobRoleId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftRule {
    pub id: i64,
    pub job_role_id: JobRoleId,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub days_of_week: Vec<u32>,
    pub min_staff: u32,
    pub archived: bool,
}

impl ShiftRule {
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        !self.archived && self.days_of_week.contains(&day_of_week(date))
    }
}

/// Low-demand window; shifts overlapping it are shrunk, split or dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TroughPeriod {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub days_of_week: Vec<u32>,
}

impl TroughPeriod {
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        self.days_of_week.contains(&day_of_week(date))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: StaffId,
    pub first_name: String,
    pub last_name: String,
    pub job_title: Option<String>,
    pub job_role_ids: Vec<JobRoleId>,
    pub employment_type: EmploymentType,
    pub wage_rate: Option<f64>,
    pub annual_salary: Option<f64>,
    pub contractor_rate: Option<f64>,
    pub is_full_time_student: bool,
    pub available_for_rota: bool,
    pub hi_score: f64,
    pub unavailable_dates: BTreeSet<NaiveDate>,
}

impl StaffMember {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn is_available_on(&self, date: NaiveDate) -> bool {
        self.available_for_rota && !self.unavailable_dates.contains(&date)
    }

    /// Hourly staff without a usable wage fall back to the role's default rate.
    pub fn cost_input(&self, hours: f64, role_default_rate: f64) -> CostInput {
        let hourly_rate = match self.wage_rate {
            Some(r) if r > 0.0 => Some(r),
            _ => Some(role_default_rate),
        };
        CostInput {
            hourly_rate,
            hours,
            employment_type: self.employment_type,
            is_full_time_student: self.is_full_time_student,
            annual_salary: self.annual_salary,
            contractor_rate: self.contractor_rate,
        }
    }
}

/// One line of a generated rota. `staff_id` is `None` when nobody could fill it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedShift {
    pub date: NaiveDate,
    pub job_role_id: JobRoleId,
    pub shift_rule_id: i64,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub hours: f64,
    pub is_part_shift: bool,
    pub staff_id: Option<StaffId>,
    pub cost: CostCalculationResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WageTargetReport {
    pub target_type: WageTargetType,
    pub target_value: f64,
    pub actual: f64,
    pub within_target: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSchedule {
    pub shifts: Vec<PlannedShift>,
    pub total_cost: f64,
    pub total_hours: f64,
    pub revenue_forecast: f64,
    pub cost_percentage: f64,
    pub unfilled_count: usize,
    pub suppressed_count: usize,
    pub wage_target: WageTargetReport,
}

impl GeneratedSchedule {
    pub fn assigned_count(&self) -> usize {
        self.shifts.len() - self.unfilled_count
    }
}
