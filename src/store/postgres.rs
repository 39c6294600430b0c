// src/store/postgres.rs

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{query, query_as, Pool, Postgres};
use tracing::debug;

use super::RotaStore;
use crate::models::{
    AlgorithmSettings, GlobalRules, JobRole, NewRotaRequest, NewRotaSchedule, NewShift,
    PutGlobalRules, RoleMapping, RotaRequest, RotaSchedule, ScheduledShift, ShiftRule, Staff,
    StaffEvaluation, TroughPeriod,
};
use crate::rota::AlgorithmConfig;

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RotaStore for PgStore {
    async fn upsert_request(&self, req: &NewRotaRequest) -> Result<RotaRequest> {
        let row = query_as::<_, RotaRequest>(
            r#"
            INSERT INTO public.rota_requests
              (location_id, week_start_date, week_end_date, status, requested_by, revenue_forecast)
            VALUES ($1,$2,$3,'draft',$4,$5)
            ON CONFLICT (location_id, week_start_date) DO UPDATE
               SET location_id = public.rota_requests.location_id
            RETURNING rota_request_id, location_id, week_start_date, week_end_date, status,
                      requested_by, revenue_forecast, created_at
            "#,
        )
        .bind(req.location_id)
        .bind(req.week_start_date)
        .bind(req.week_end_date)
        .bind(req.requested_by)
        .bind(Json(&req.revenue_forecast))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_staff(&self, location_id: i64) -> Result<Vec<Staff>> {
        let rows = query_as::<_, Staff>(
            r#"SELECT staff_id, location_id, first_name, last_name, job_title, job_role_ids,
                      employment_type, wage_rate, annual_salary, contractor_rate,
                      is_full_time_student, available_for_rota, unavailable_dates
               FROM public.staff WHERE location_id=$1 ORDER BY staff_id"#,
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_staff_evaluations(&self, location_id: i64) -> Result<Vec<StaffEvaluation>> {
        let rows = query_as::<_, StaffEvaluation>(
            r#"SELECT e.staff_id, e.weighted_score
               FROM public.staff_evaluations e
               JOIN public.staff s ON s.staff_id = e.staff_id
               WHERE s.location_id=$1
               ORDER BY e.staff_id, e.staff_evaluation_id"#,
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_job_roles(&self, location_id: i64) -> Result<Vec<JobRole>> {
        let rows = query_as::<_, JobRole>(
            r#"SELECT job_role_id, location_id, title, is_kitchen, default_wage_rate
               FROM public.job_roles WHERE location_id=$1 ORDER BY job_role_id"#,
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_role_mappings(&self, location_id: i64) -> Result<Vec<RoleMapping>> {
        let rows = query_as::<_, RoleMapping>(
            r#"SELECT role_mapping_id, location_id, job_title, job_role_id
               FROM public.role_mappings WHERE location_id=$1 ORDER BY role_mapping_id"#,
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_shift_rules(&self, location_id: i64) -> Result<Vec<ShiftRule>> {
        let rows = query_as::<_, ShiftRule>(
            r#"SELECT shift_rule_id, location_id, job_role_id, start_time, end_time,
                      days_of_week, min_staff, archived
               FROM public.shift_rules WHERE location_id=$1 ORDER BY shift_rule_id"#,
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_trough_periods(&self, location_id: i64) -> Result<Vec<TroughPeriod>> {
        let rows = query_as::<_, TroughPeriod>(
            r#"SELECT trough_period_id, location_id, start_time, end_time, days_of_week
               FROM public.trough_periods WHERE location_id=$1 ORDER BY trough_period_id"#,
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_global_rules(&self, location_id: i64) -> Result<Option<GlobalRules>> {
        let row = query_as::<_, GlobalRules>(
            r#"SELECT location_id, wage_target_type, wage_target_value, max_shifts_per_week,
                      min_rest_hours_between_shifts, max_consecutive_days_worked, updated_at
               FROM public.global_rules WHERE location_id=$1"#,
        )
        .bind(location_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn put_global_rules(&self, location_id: i64, rules: &PutGlobalRules) -> Result<GlobalRules> {
        let row = query_as::<_, GlobalRules>(
            r#"
            INSERT INTO public.global_rules
              (location_id, wage_target_type, wage_target_value, max_shifts_per_week,
               min_rest_hours_between_shifts, max_consecutive_days_worked)
            VALUES ($1,$2,$3,$4,$5,$6)
            ON CONFLICT (location_id) DO UPDATE
               SET wage_target_type = EXCLUDED.wage_target_type,
                   wage_target_value = EXCLUDED.wage_target_value,
                   max_shifts_per_week = EXCLUDED.max_shifts_per_week,
                   min_rest_hours_between_shifts = EXCLUDED.min_rest_hours_between_shifts,
                   max_consecutive_days_worked = EXCLUDED.max_consecutive_days_worked,
                   updated_at = now()
            RETURNING location_id, wage_target_type, wage_target_value, max_shifts_per_week,
                      min_rest_hours_between_shifts, max_consecutive_days_worked, updated_at
            "#,
        )
        .bind(location_id)
        .bind(rules.wage_target_type.as_str())
        .bind(rules.wage_target_value)
        .bind(i32::try_from(rules.max_shifts_per_week)?)
        .bind(rules.min_rest_hours_between_shifts)
        .bind(i32::try_from(rules.max_consecutive_days_worked)?)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_algorithm_settings(&self, location_id: i64) -> Result<Option<AlgorithmSettings>> {
        let row = query_as::<_, AlgorithmSettings>(
            r#"SELECT location_id, salaried_weight, manager_weight, hi_score_weight,
                      enable_part_shifts, min_part_shift_hours, max_part_shift_hours, updated_at
               FROM public.algorithm_settings WHERE location_id=$1"#,
        )
        .bind(location_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn put_algorithm_settings(
        &self,
        location_id: i64,
        config: &AlgorithmConfig,
    ) -> Result<AlgorithmSettings> {
        let row = query_as::<_, AlgorithmSettings>(
            r#"
            INSERT INTO public.algorithm_settings
              (location_id, salaried_weight, manager_weight, hi_score_weight,
               enable_part_shifts, min_part_shift_hours, max_part_shift_hours)
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            ON CONFLICT (location_id) DO UPDATE
               SET salaried_weight = EXCLUDED.salaried_weight,
                   manager_weight = EXCLUDED.manager_weight,
                   hi_score_weight = EXCLUDED.hi_score_weight,
                   enable_part_shifts = EXCLUDED.enable_part_shifts,
                   min_part_shift_hours = EXCLUDED.min_part_shift_hours,
                   max_part_shift_hours = EXCLUDED.max_part_shift_hours,
                   updated_at = now()
            RETURNING location_id, salaried_weight, manager_weight, hi_score_weight,
                      enable_part_shifts, min_part_shift_hours, max_part_shift_hours, updated_at
            "#,
        )
        .bind(location_id)
        .bind(config.salaried_weight)
        .bind(config.manager_weight)
        .bind(config.hi_score_weight)
        .bind(config.enable_part_shifts)
        .bind(config.min_part_shift_hours)
        .bind(config.max_part_shift_hours)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn save_schedule(&self, schedule: &NewRotaSchedule, shifts: &[NewShift]) -> Result<RotaSchedule> {
        let mut tx = self.pool.begin().await?;

        let row = query_as::<_, RotaSchedule>(
            r#"
            INSERT INTO public.rota_schedules
              (rota_request_id, location_id, week_start_date, week_end_date, status,
               total_cost, revenue_forecast, cost_percentage, unfilled_shifts, input_hash, created_by)
            VALUES ($1,$2,$3,$4,'draft',$5,$6,$7,$8,$9,$10)
            ON CONFLICT (rota_request_id) DO UPDATE
               SET week_start_date = EXCLUDED.week_start_date,
                   week_end_date = EXCLUDED.week_end_date,
                   status = 'draft',
                   total_cost = EXCLUDED.total_cost,
                   revenue_forecast = EXCLUDED.revenue_forecast,
                   cost_percentage = EXCLUDED.cost_percentage,
                   unfilled_shifts = EXCLUDED.unfilled_shifts,
                   input_hash = EXCLUDED.input_hash,
                   created_by = EXCLUDED.created_by,
                   created_at = now()
            RETURNING rota_schedule_id, rota_request_id, location_id, week_start_date, week_end_date,
                      status, total_cost, revenue_forecast, cost_percentage, unfilled_shifts,
                      input_hash, created_by, created_at
            "#,
        )
        .bind(schedule.rota_request_id)
        .bind(schedule.location_id)
        .bind(schedule.week_start_date)
        .bind(schedule.week_end_date)
        .bind(schedule.total_cost)
        .bind(schedule.revenue_forecast)
        .bind(schedule.cost_percentage)
        .bind(schedule.unfilled_shifts)
        .bind(&schedule.input_hash)
        .bind(schedule.created_by)
        .fetch_one(&mut *tx)
        .await
        .context("upserting rota schedule")?;

        // Regeneration replaces the previous shift set.
        let replaced = query(r#"DELETE FROM public.rota_shifts WHERE rota_schedule_id=$1"#)
            .bind(row.rota_schedule_id)
            .execute(&mut *tx)
            .await
            .context("clearing previous shifts")?;
        debug!(schedule = row.rota_schedule_id, replaced = replaced.rows_affected(), "cleared shifts");

        for s in shifts {
            query(
                r#"
                INSERT INTO public.rota_shifts
                    (rota_schedule_id, staff_id, job_role_id, shift_rule_id, date, start_time,
                     end_time, hours, is_part_shift, basic_pay, ni_cost, pension_cost, total_cost)
                VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)
                "#,
            )
            .bind(row.rota_schedule_id)
            .bind(s.staff_id)
            .bind(s.job_role_id)
            .bind(s.shift_rule_id)
            .bind(s.date)
            .bind(s.start_time)
            .bind(s.end_time)
            .bind(s.hours)
            .bind(s.is_part_shift)
            .bind(s.basic_pay)
            .bind(s.ni_cost)
            .bind(s.pension_cost)
            .bind(s.total_cost)
            .execute(&mut *tx)
            .await
            .context("inserting rota shift")?;
        }

        query(
            r#"
            UPDATE public.rota_requests
               SET status = 'generated',
                   week_end_date = $2,
                   requested_by = $3,
                   revenue_forecast = $4
             WHERE rota_request_id = $1
            "#,
        )
            .bind(schedule.rota_request_id)
            .bind(schedule.week_end_date)
            .bind(schedule.created_by)
            .bind(Json(&schedule.daily_forecast))
            .execute(&mut *tx)
            .await
            .context("marking request generated")?;

        tx.commit().await?;
        Ok(row)
    }

    async fn list_schedules(&self, location_id: i64) -> Result<Vec<RotaSchedule>> {
        let rows = query_as::<_, RotaSchedule>(
            r#"SELECT * FROM public.rota_schedules WHERE location_id=$1
               ORDER BY week_start_date DESC, rota_schedule_id DESC"#,
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_schedule(&self, rota_schedule_id: i64) -> Result<Option<RotaSchedule>> {
        let row = query_as::<_, RotaSchedule>(
            r#"SELECT * FROM public.rota_schedules WHERE rota_schedule_id=$1"#,
        )
        .bind(rota_schedule_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_schedule_shifts(&self, rota_schedule_id: i64) -> Result<Vec<ScheduledShift>> {
        let rows = query_as::<_, ScheduledShift>(
            r#"SELECT shift_id, rota_schedule_id, staff_id, job_role_id, shift_rule_id, date,
                      start_time, end_time, hours, is_part_shift, basic_pay, ni_cost,
                      pension_cost, total_cost
               FROM public.rota_shifts WHERE rota_schedule_id=$1
               ORDER BY date, start_time, shift_id"#,
        )
        .bind(rota_schedule_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
