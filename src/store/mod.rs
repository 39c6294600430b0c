// src/store/mod.rs
//
// Storage seam between the HTTP/orchestration layer and Postgres.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{
    AlgorithmSettings, GlobalRules, JobRole, NewRotaRequest, NewRotaSchedule, NewShift,
    PutGlobalRules, RoleMapping, RotaRequest, RotaSchedule, ScheduledShift, ShiftRule, Staff,
    StaffEvaluation, TroughPeriod,
};
use crate::rota::AlgorithmConfig;

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[async_trait]
pub trait RotaStore: Send + Sync {
    /// One request per location + week start. An existing request is
    /// returned untouched; it only changes when a schedule commits.
    async fn upsert_request(&self, req: &NewRotaRequest) -> Result<RotaRequest>;

    async fn list_staff(&self, location_id: i64) -> Result<Vec<Staff>>;
    async fn list_staff_evaluations(&self, location_id: i64) -> Result<Vec<StaffEvaluation>>;
    async fn list_job_roles(&self, location_id: i64) -> Result<Vec<JobRole>>;
    async fn list_role_mappings(&self, location_id: i64) -> Result<Vec<RoleMapping>>;
    /// Includes archived rules.
    async fn list_shift_rules(&self, location_id: i64) -> Result<Vec<ShiftRule>>;
    async fn list_trough_periods(&self, location_id: i64) -> Result<Vec<TroughPeriod>>;

    async fn get_global_rules(&self, location_id: i64) -> Result<Option<GlobalRules>>;
    async fn put_global_rules(&self, location_id: i64, rules: &PutGlobalRules) -> Result<GlobalRules>;
    async fn get_algorithm_settings(&self, location_id: i64) -> Result<Option<AlgorithmSettings>>;
    async fn put_algorithm_settings(
        &self,
        location_id: i64,
        config: &AlgorithmConfig,
    ) -> Result<AlgorithmSettings>;

    /// Atomically upserts the request's schedule, replaces its shifts and
    /// marks the request generated with the run's forecast. Nothing is kept
    /// on failure.
    async fn save_schedule(&self, schedule: &NewRotaSchedule, shifts: &[NewShift]) -> Result<RotaSchedule>;

    async fn list_schedules(&self, location_id: i64) -> Result<Vec<RotaSchedule>>;
    async fn get_schedule(&self, rota_schedule_id: i64) -> Result<Option<RotaSchedule>>;
    async fn list_schedule_shifts(&self, rota_schedule_id: i64) -> Result<Vec<ScheduledShift>>;
}
