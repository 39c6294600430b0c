// src/store/memory.rs
//
// In-process store for tests, with switchable failures per operation.

use std::collections::HashSet;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;

use super::RotaStore;
use crate::models::{
    AlgorithmSettings, GlobalRules, JobRole, NewRotaRequest, NewRotaSchedule, NewShift,
    PutGlobalRules, RoleMapping, RotaRequest, RotaSchedule, ScheduledShift, ShiftRule, Staff,
    StaffEvaluation, TroughPeriod,
};
use crate::rota::AlgorithmConfig;

#[derive(Debug, Default, Clone)]
pub struct MemoryData {
    pub staff: Vec<Staff>,
    pub evaluations: Vec<StaffEvaluation>,
    pub job_roles: Vec<JobRole>,
    pub role_mappings: Vec<RoleMapping>,
    pub shift_rules: Vec<ShiftRule>,
    pub trough_periods: Vec<TroughPeriod>,
    pub global_rules: Vec<GlobalRules>,
    pub algorithm_settings: Vec<AlgorithmSettings>,
    pub requests: Vec<RotaRequest>,
    pub schedules: Vec<RotaSchedule>,
    pub shifts: Vec<ScheduledShift>,
}

#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<MemoryData>,
    failing: Mutex<HashSet<&'static str>>,
}

impl MemoryStore {
    pub fn new(data: MemoryData) -> Self {
        Self {
            data: Mutex::new(data),
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Make the named trait method return an error until further notice.
    pub fn fail_on(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn snapshot(&self) -> MemoryData {
        self.data.lock().unwrap().clone()
    }

    fn check(&self, op: &'static str) -> Result<()> {
        if self.failing.lock().unwrap().contains(op) {
            return Err(anyhow!("{op}: connection reset"));
        }
        Ok(())
    }
}

#[async_trait]
impl RotaStore for MemoryStore {
    async fn upsert_request(&self, req: &NewRotaRequest) -> Result<RotaRequest> {
        self.check("upsert_request")?;
        let mut data = self.data.lock().unwrap();
        let next_id = data.requests.len() as i64 + 1;
        let existing = data
            .requests
            .iter()
            .find(|r| r.location_id == req.location_id && r.week_start_date == req.week_start_date)
            .cloned();
        let row = match existing {
            Some(r) => r,
            None => {
                let r = RotaRequest {
                    rota_request_id: next_id,
                    location_id: req.location_id,
                    week_start_date: req.week_start_date,
                    week_end_date: req.week_end_date,
                    status: "draft".into(),
                    requested_by: req.requested_by,
                    revenue_forecast: Json(req.revenue_forecast.clone()),
                    created_at: Utc::now(),
                };
                data.requests.push(r.clone());
                r
            }
        };
        Ok(row)
    }

    async fn list_staff(&self, location_id: i64) -> Result<Vec<Staff>> {
        self.check("list_staff")?;
        let data = self.data.lock().unwrap();
        Ok(data.staff.iter().filter(|s| s.location_id == location_id).cloned().collect())
    }

    async fn list_staff_evaluations(&self, location_id: i64) -> Result<Vec<StaffEvaluation>> {
        self.check("list_staff_evaluations")?;
        let data = self.data.lock().unwrap();
        let ids: HashSet<i64> = data
            .staff
            .iter()
            .filter(|s| s.location_id == location_id)
            .map(|s| s.staff_id)
            .collect();
        Ok(data.evaluations.iter().filter(|e| ids.contains(&e.staff_id)).cloned().collect())
    }

    async fn list_job_roles(&self, location_id: i64) -> Result<Vec<JobRole>> {
        self.check("list_job_roles")?;
        let data = self.data.lock().unwrap();
        Ok(data.job_roles.iter().filter(|r| r.location_id == location_id).cloned().collect())
    }

    async fn list_role_mappings(&self, location_id: i64) -> Result<Vec<RoleMapping>> {
        self.check("list_role_mappings")?;
        let data = self.data.lock().unwrap();
        Ok(data.role_mappings.iter().filter(|m| m.location_id == location_id).cloned().collect())
    }

    async fn list_shift_rules(&self, location_id: i64) -> Result<Vec<ShiftRule>> {
        self.check("list_shift_rules")?;
        let data = self.data.lock().unwrap();
        Ok(data.shift_rules.iter().filter(|r| r.location_id == location_id).cloned().collect())
    }

    async fn list_trough_periods(&self, location_id: i64) -> Result<Vec<TroughPeriod>> {
        self.check("list_trough_periods")?;
        let data = self.data.lock().unwrap();
        Ok(data.trough_periods.iter().filter(|t| t.location_id == location_id).cloned().collect())
    }

    async fn get_global_rules(&self, location_id: i64) -> Result<Option<GlobalRules>> {
        self.check("get_global_rules")?;
        let data = self.data.lock().unwrap();
        Ok(data.global_rules.iter().find(|g| g.location_id == location_id).cloned())
    }

    async fn put_global_rules(&self, location_id: i64, rules: &PutGlobalRules) -> Result<GlobalRules> {
        self.check("put_global_rules")?;
        let row = GlobalRules {
            location_id,
            wage_target_type: rules.wage_target_type.as_str().to_string(),
            wage_target_value: rules.wage_target_value,
            max_shifts_per_week: rules.max_shifts_per_week as i32,
            min_rest_hours_between_shifts: rules.min_rest_hours_between_shifts,
            max_consecutive_days_worked: rules.max_consecutive_days_worked as i32,
            updated_at: Utc::now(),
        };
        let mut data = self.data.lock().unwrap();
        data.global_rules.retain(|g| g.location_id != location_id);
        data.global_rules.push(row.clone());
        Ok(row)
    }

    async fn get_algorithm_settings(&self, location_id: i64) -> Result<Option<AlgorithmSettings>> {
        self.check("get_algorithm_settings")?;
        let data = self.data.lock().unwrap();
        Ok(data.algorithm_settings.iter().find(|a| a.location_id == location_id).cloned())
    }

    async fn put_algorithm_settings(
        &self,
        location_id: i64,
        config: &AlgorithmConfig,
    ) -> Result<AlgorithmSettings> {
        self.check("put_algorithm_settings")?;
        let row = AlgorithmSettings {
            location_id,
            salaried_weight: config.salaried_weight,
            manager_weight: config.manager_weight,
            hi_score_weight: config.hi_score_weight,
            enable_part_shifts: config.enable_part_shifts,
            min_part_shift_hours: config.min_part_shift_hours,
            max_part_shift_hours: config.max_part_shift_hours,
            updated_at: Utc::now(),
        };
        let mut data = self.data.lock().unwrap();
        data.algorithm_settings.retain(|a| a.location_id != location_id);
        data.algorithm_settings.push(row.clone());
        Ok(row)
    }

    async fn save_schedule(&self, schedule: &NewRotaSchedule, shifts: &[NewShift]) -> Result<RotaSchedule> {
        self.check("save_schedule")?;
        let mut data = self.data.lock().unwrap();

        let id = data
            .schedules
            .iter()
            .find(|s| s.rota_request_id == schedule.rota_request_id)
            .map(|s| s.rota_schedule_id)
            .unwrap_or(data.schedules.len() as i64 + 1);
        let row = RotaSchedule {
            rota_schedule_id: id,
            rota_request_id: schedule.rota_request_id,
            location_id: schedule.location_id,
            week_start_date: schedule.week_start_date,
            week_end_date: schedule.week_end_date,
            status: "draft".into(),
            total_cost: schedule.total_cost,
            revenue_forecast: schedule.revenue_forecast,
            cost_percentage: schedule.cost_percentage,
            unfilled_shifts: schedule.unfilled_shifts,
            input_hash: schedule.input_hash.clone(),
            created_by: schedule.created_by,
            created_at: Utc::now(),
        };
        data.schedules.retain(|s| s.rota_schedule_id != id);
        data.schedules.push(row.clone());

        data.shifts.retain(|s| s.rota_schedule_id != id);
        let base = data.shifts.iter().map(|s| s.shift_id).max().unwrap_or(0);
        for (i, s) in shifts.iter().enumerate() {
            data.shifts.push(ScheduledShift {
                shift_id: base + i as i64 + 1,
                rota_schedule_id: id,
                staff_id: s.staff_id,
                job_role_id: s.job_role_id,
                shift_rule_id: s.shift_rule_id,
                date: s.date,
                start_time: s.start_time,
                end_time: s.end_time,
                hours: s.hours,
                is_part_shift: s.is_part_shift,
                basic_pay: s.basic_pay,
                ni_cost: s.ni_cost,
                pension_cost: s.pension_cost,
                total_cost: s.total_cost,
            });
        }

        if let Some(r) = data
            .requests
            .iter_mut()
            .find(|r| r.rota_request_id == schedule.rota_request_id)
        {
            r.status = "generated".into();
            r.week_end_date = schedule.week_end_date;
            r.requested_by = schedule.created_by;
            r.revenue_forecast = Json(schedule.daily_forecast.clone());
        }
        Ok(row)
    }

    async fn list_schedules(&self, location_id: i64) -> Result<Vec<RotaSchedule>> {
        self.check("list_schedules")?;
        let data = self.data.lock().unwrap();
        let mut rows: Vec<RotaSchedule> = data
            .schedules
            .iter()
            .filter(|s| s.location_id == location_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.week_start_date
                .cmp(&a.week_start_date)
                .then(b.rota_schedule_id.cmp(&a.rota_schedule_id))
        });
        Ok(rows)
    }

    async fn get_schedule(&self, rota_schedule_id: i64) -> Result<Option<RotaSchedule>> {
        self.check("get_schedule")?;
        let data = self.data.lock().unwrap();
        Ok(data.schedules.iter().find(|s| s.rota_schedule_id == rota_schedule_id).cloned())
    }

    async fn list_schedule_shifts(&self, rota_schedule_id: i64) -> Result<Vec<ScheduledShift>> {
        self.check("list_schedule_shifts")?;
        let data = self.data.lock().unwrap();
        let mut rows: Vec<ScheduledShift> = data
            .shifts
            .iter()
            .filter(|s| s.rota_schedule_id == rota_schedule_id)
            .cloned()
            .collect();
        rows.sort_by_key(|s| (s.date, s.start_time, s.shift_id));
        Ok(rows)
    }
}
