// src/service.rs
//
// Orchestrates a rota generation run: load a location's inputs, run the
// scheduler, price the result and persist it.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::cost_client::EmployerCostCalculator;
use crate::error::RotaError;
use crate::models::{
    GenerationSummary, NewRotaRequest, NewRotaSchedule, NewShift, PutGlobalRules, RotaSchedule,
    ScheduledShift,
};
use crate::rota::{
    model::{JobRole, RoleMapping, ShiftRule, TroughPeriod},
    ranking::{hi_scores, rank_candidates, RankedCandidate, StaffEvaluation},
    roles::RoleCatalog,
    AlgorithmConfig, GeneratedSchedule, GlobalConstraints, RotaSchedulingAlgorithm, RotaWeek,
    StaffMember,
};
use crate::store::RotaStore;

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRotaBody {
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    #[serde(default)]
    pub revenue_forecast: BTreeMap<NaiveDate, f64>,
    pub requested_by: Option<i64>,
}

impl GenerateRotaBody {
    fn validate(&self, location_id: i64) -> Result<(), RotaError> {
        if location_id <= 0 {
            return Err(RotaError::Validation(format!(
                "location_id must be positive, got {location_id}"
            )));
        }
        let span = (self.week_end_date - self.week_start_date).num_days();
        if !(0..RotaWeek::MAX_DAYS).contains(&span) {
            return Err(RotaError::Validation(format!(
                "week {}..{} must span one to seven days",
                self.week_start_date, self.week_end_date
            )));
        }
        for (date, value) in &self.revenue_forecast {
            if *date < self.week_start_date || *date > self.week_end_date {
                return Err(RotaError::Validation(format!(
                    "revenue forecast date {date} is outside the requested week"
                )));
            }
            if !value.is_finite() || *value < 0.0 {
                return Err(RotaError::Validation(format!(
                    "revenue forecast for {date} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Everything the scheduler needs for one location, already in domain form.
struct LocationInputs {
    staff: Vec<StaffMember>,
    job_roles: Vec<JobRole>,
    role_mappings: Vec<RoleMapping>,
    shift_rules: Vec<ShiftRule>,
    trough_periods: Vec<TroughPeriod>,
    constraints: GlobalConstraints,
    config: AlgorithmConfig,
}

#[derive(Clone)]
pub struct RotaService {
    store: Arc<dyn RotaStore>,
    calculator: Arc<EmployerCostCalculator>,
}

impl RotaService {
    pub fn new(store: Arc<dyn RotaStore>, calculator: Arc<EmployerCostCalculator>) -> Self {
        Self { store, calculator }
    }

    pub fn calculator(&self) -> &EmployerCostCalculator {
        &self.calculator
    }

    pub async fn generate(
        &self,
        location_id: i64,
        body: GenerateRotaBody,
    ) -> Result<GenerationSummary, RotaError> {
        body.validate(location_id)?;

        let run_id = Uuid::new_v4();
        let span = info_span!(
            "rota_generation",
            location_id,
            week_start = %body.week_start_date,
            %run_id
        );
        self.generate_inner(location_id, body, run_id)
            .instrument(span)
            .await
    }

    async fn generate_inner(
        &self,
        location_id: i64,
        body: GenerateRotaBody,
        run_id: Uuid,
    ) -> Result<GenerationSummary, RotaError> {
        // 1) Draft request
        let request = self
            .store
            .upsert_request(&NewRotaRequest {
                location_id,
                week_start_date: body.week_start_date,
                week_end_date: body.week_end_date,
                requested_by: body.requested_by,
                revenue_forecast: body.revenue_forecast.clone(),
            })
            .await
            .map_err(RotaError::fetch("rota request"))?;

        // 2) Inputs
        let inputs = self.load_inputs(location_id).await?;
        if inputs.staff.is_empty() {
            return Err(RotaError::MissingInput(format!(
                "location {location_id} has no staff"
            )));
        }
        info!(
            staff = inputs.staff.len(),
            job_roles = inputs.job_roles.len(),
            shift_rules = inputs.shift_rules.len(),
            trough_periods = inputs.trough_periods.len(),
            "inputs loaded"
        );

        // 3) Schedule
        let constraints = inputs.constraints.clone();
        let mut algo = RotaSchedulingAlgorithm::new(
            RotaWeek {
                location_id,
                week_start: body.week_start_date,
                week_end: body.week_end_date,
                revenue_forecast: body.revenue_forecast,
            },
            inputs.staff.clone(),
            inputs.job_roles.clone(),
            inputs.constraints,
            inputs.config,
        );
        algo.set_shift_rules(inputs.shift_rules);
        algo.set_trough_periods(inputs.trough_periods);
        algo.set_role_mappings(inputs.role_mappings.clone());

        let mut schedule = algo.generate_schedule()?;

        // 4) Authoritative pricing
        if self.calculator.is_remote() {
            let mut catalog = RoleCatalog::new(&inputs.job_roles);
            catalog.set_mappings(&inputs.role_mappings);
            self.price(&mut schedule, &inputs.staff, &catalog).await;
            schedule.retotal(&constraints);
        }

        let input_hash = algo
            .input_hash()
            .map_err(|e| RotaError::Persist(anyhow::Error::new(e).context("hashing inputs")))?;

        // 5) Persist
        let shifts: Vec<NewShift> = schedule.shifts.iter().map(NewShift::from).collect();
        let saved = self
            .store
            .save_schedule(
                &NewRotaSchedule {
                    rota_request_id: request.rota_request_id,
                    location_id,
                    week_start_date: algo.week().week_start,
                    week_end_date: algo.week().week_end,
                    total_cost: schedule.total_cost,
                    revenue_forecast: schedule.revenue_forecast,
                    cost_percentage: schedule.cost_percentage,
                    unfilled_shifts: i32::try_from(schedule.unfilled_count).unwrap_or(i32::MAX),
                    input_hash: input_hash.clone(),
                    created_by: body.requested_by,
                    daily_forecast: algo.week().revenue_forecast.clone(),
                },
                &shifts,
            )
            .await
            .map_err(RotaError::Persist)?;

        info!(
            rota_schedule_id = saved.rota_schedule_id,
            shifts = shifts.len(),
            unfilled = schedule.unfilled_count,
            total_cost = schedule.total_cost,
            "rota schedule saved"
        );

        Ok(GenerationSummary {
            rota_request_id: request.rota_request_id,
            rota_schedule_id: saved.rota_schedule_id,
            run_id,
            shift_count: schedule.shifts.len(),
            assigned_count: schedule.assigned_count(),
            unfilled_count: schedule.unfilled_count,
            suppressed_count: schedule.suppressed_count,
            total_cost: schedule.total_cost,
            revenue_forecast: schedule.revenue_forecast,
            cost_percentage: schedule.cost_percentage,
            wage_target: schedule.wage_target,
            input_hash,
        })
    }

    async fn price(&self, schedule: &mut GeneratedSchedule, staff: &[StaffMember], catalog: &RoleCatalog) {
        let by_id: HashMap<i64, &StaffMember> = staff.iter().map(|s| (s.id, s)).collect();
        for shift in &mut schedule.shifts {
            let Some(member) = shift.staff_id.and_then(|id| by_id.get(&id)) else {
                continue;
            };
            let input = member.cost_input(shift.hours, catalog.default_wage_rate(shift.job_role_id));
            shift.cost = self.calculator.calculate(&input).await;
        }
    }

    async fn load_inputs(&self, location_id: i64) -> Result<LocationInputs, RotaError> {
        let store = &self.store;

        let staff_rows = store.list_staff(location_id).await.map_err(RotaError::fetch("staff"))?;
        let evaluations: Vec<StaffEvaluation> = store
            .list_staff_evaluations(location_id)
            .await
            .map_err(RotaError::fetch("staff evaluations"))?
            .into_iter()
            .map(Into::into)
            .collect();
        let job_roles: Vec<JobRole> = store
            .list_job_roles(location_id)
            .await
            .map_err(RotaError::fetch("job roles"))?
            .into_iter()
            .map(Into::into)
            .collect();
        let role_mappings: Vec<RoleMapping> = store
            .list_role_mappings(location_id)
            .await
            .map_err(RotaError::fetch("role mappings"))?
            .into_iter()
            .map(Into::into)
            .collect();
        let shift_rules: Vec<ShiftRule> = store
            .list_shift_rules(location_id)
            .await
            .map_err(RotaError::fetch("shift rules"))?
            .into_iter()
            .map(Into::into)
            .collect();
        let trough_periods: Vec<TroughPeriod> = store
            .list_trough_periods(location_id)
            .await
            .map_err(RotaError::fetch("trough periods"))?
            .into_iter()
            .map(Into::into)
            .collect();

        let constraints = self.effective_global_rules(location_id).await?;
        let config = self.effective_algorithm_config(location_id).await?;

        let scores = hi_scores(&evaluations);
        let staff = staff_rows
            .into_iter()
            .map(|s| {
                let score = scores.get(&s.staff_id).copied().unwrap_or(0.0);
                s.into_domain(score)
            })
            .collect();

        Ok(LocationInputs {
            staff,
            job_roles,
            role_mappings,
            shift_rules,
            trough_periods,
            constraints,
            config,
        })
    }

    /// Stored global rules, or the defaults when the location has none.
    pub async fn effective_global_rules(&self, location_id: i64) -> Result<GlobalConstraints, RotaError> {
        let row = self
            .store
            .get_global_rules(location_id)
            .await
            .map_err(RotaError::fetch("global rules"))?;
        match row {
            Some(r) => r.to_constraints().map_err(RotaError::MissingInput),
            None => {
                warn!(location_id, "no global rules stored; using defaults");
                Ok(GlobalConstraints::default())
            }
        }
    }

    pub async fn put_global_rules(
        &self,
        location_id: i64,
        body: &PutGlobalRules,
    ) -> Result<GlobalConstraints, RotaError> {
        GlobalConstraints::from(body)
            .validate()
            .map_err(|e| RotaError::Validation(e.to_string()))?;
        let row = self
            .store
            .put_global_rules(location_id, body)
            .await
            .map_err(RotaError::Persist)?;
        row.to_constraints().map_err(RotaError::MissingInput)
    }

    /// Stored algorithm settings, or the defaults when the location has none.
    pub async fn effective_algorithm_config(&self, location_id: i64) -> Result<AlgorithmConfig, RotaError> {
        let row = self
            .store
            .get_algorithm_settings(location_id)
            .await
            .map_err(RotaError::fetch("algorithm settings"))?;
        Ok(match row {
            Some(r) => AlgorithmConfig::from(&r),
            None => {
                warn!(location_id, "no algorithm settings stored; using defaults");
                AlgorithmConfig::default()
            }
        })
    }

    pub async fn put_algorithm_config(
        &self,
        location_id: i64,
        config: &AlgorithmConfig,
    ) -> Result<AlgorithmConfig, RotaError> {
        config
            .validate()
            .map_err(|e| RotaError::Validation(e.to_string()))?;
        let row = self
            .store
            .put_algorithm_settings(location_id, config)
            .await
            .map_err(RotaError::Persist)?;
        Ok(AlgorithmConfig::from(&row))
    }

    /// Available staff in the order the scheduler would consider them.
    pub async fn staff_ranking(&self, location_id: i64) -> Result<Vec<RankedCandidate>, RotaError> {
        let inputs = self.load_inputs(location_id).await?;
        let mut catalog = RoleCatalog::new(&inputs.job_roles);
        catalog.set_mappings(&inputs.role_mappings);
        let available: Vec<StaffMember> = inputs
            .staff
            .into_iter()
            .filter(|s| s.available_for_rota)
            .collect();
        Ok(rank_candidates(&available, &inputs.config, &catalog))
    }

    pub async fn schedules(&self, location_id: i64) -> Result<Vec<RotaSchedule>, RotaError> {
        self.store
            .list_schedules(location_id)
            .await
            .map_err(RotaError::fetch("rota schedules"))
    }

    pub async fn schedule(&self, rota_schedule_id: i64) -> Result<RotaSchedule, RotaError> {
        self.store
            .get_schedule(rota_schedule_id)
            .await
            .map_err(RotaError::fetch("rota schedule"))?
            .ok_or_else(|| RotaError::NotFound(format!("rota schedule {rota_schedule_id}")))
    }

    pub async fn schedule_shifts(&self, rota_schedule_id: i64) -> Result<Vec<ScheduledShift>, RotaError> {
        self.schedule(rota_schedule_id).await?;
        self.store
            .list_schedule_shifts(rota_schedule_id)
            .await
            .map_err(RotaError::fetch("rota shifts"))
    }
}


#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::fixtures::{bar, staff, week_body, LOCATION};
    use super::*;
    use crate::rota::WageTargetType;
    use crate::store::memory::MemoryStore;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn service(store: Arc<MemoryStore>) -> RotaService {
        RotaService::new(store, Arc::new(EmployerCostCalculator::Local))
    }

    #[tokio::test]
    async fn generates_and_persists_a_week() {
        let store = Arc::new(MemoryStore::new(bar()));
        let summary = service(store.clone()).generate(LOCATION, week_body()).await.unwrap();

        assert_eq!(summary.shift_count, 5);
        assert_eq!(summary.assigned_count, 5);
        assert_eq!(summary.unfilled_count, 0);
        assert!(close(summary.total_cost, 257.5));
        assert!(close(summary.revenue_forecast, 7000.0));
        assert!(summary.wage_target.within_target);
        assert_eq!(summary.input_hash.len(), 64);

        let data = store.snapshot();
        assert_eq!(data.requests.len(), 1);
        assert_eq!(data.requests[0].status, "generated");
        assert_eq!(data.schedules.len(), 1);
        assert_eq!(data.schedules[0].rota_schedule_id, summary.rota_schedule_id);
        assert_eq!(data.shifts.len(), 5);
        assert!(data.shifts.iter().all(|s| s.staff_id == Some(1) && close(s.total_cost, 51.5)));
    }

    #[tokio::test]
    async fn regenerating_replaces_the_previous_shifts() {
        let store = Arc::new(MemoryStore::new(bar()));
        let svc = service(store.clone());
        let first = svc.generate(LOCATION, week_body()).await.unwrap();
        let second = svc.generate(LOCATION, week_body()).await.unwrap();

        assert_eq!(first.rota_request_id, second.rota_request_id);
        assert_eq!(first.rota_schedule_id, second.rota_schedule_id);
        assert_eq!(first.input_hash, second.input_hash);
        assert_ne!(first.run_id, second.run_id);

        let data = store.snapshot();
        assert_eq!(data.schedules.len(), 1);
        assert_eq!(data.shifts.len(), 5);
    }

    #[tokio::test]
    async fn failed_regeneration_leaves_the_committed_request_alone() {
        let store = Arc::new(MemoryStore::new(bar()));
        let svc = service(store.clone());
        let first = week_body();
        svc.generate(LOCATION, first.clone()).await.unwrap();

        let mut busier = week_body();
        for v in busier.revenue_forecast.values_mut() {
            *v = 2500.0;
        }
        store.fail_on("list_staff");
        let err = svc.generate(LOCATION, busier.clone()).await.unwrap_err();
        assert!(matches!(err, RotaError::Fetch { .. }));

        let data = store.snapshot();
        assert_eq!(data.requests.len(), 1);
        assert_eq!(data.requests[0].status, "generated");
        assert_eq!(data.requests[0].revenue_forecast.0, first.revenue_forecast);
        assert_eq!(data.schedules.len(), 1);
        assert_eq!(data.shifts.len(), 5);
    }

    #[tokio::test]
    async fn successful_regeneration_records_the_new_forecast() {
        let store = Arc::new(MemoryStore::new(bar()));
        let svc = service(store.clone());
        svc.generate(LOCATION, week_body()).await.unwrap();

        let mut busier = week_body();
        for v in busier.revenue_forecast.values_mut() {
            *v = 2500.0;
        }
        busier.requested_by = Some(8);
        let summary = svc.generate(LOCATION, busier.clone()).await.unwrap();
        assert!(close(summary.revenue_forecast, 17500.0));

        let data = store.snapshot();
        assert_eq!(data.requests[0].status, "generated");
        assert_eq!(data.requests[0].revenue_forecast.0, busier.revenue_forecast);
        assert_eq!(data.requests[0].requested_by, Some(8));
        assert!(close(data.schedules[0].revenue_forecast, 17500.0));
    }

    #[tokio::test]
    async fn invalid_requests_are_rejected_before_any_write() {
        let store = Arc::new(MemoryStore::new(bar()));
        let svc = service(store.clone());

        let err = svc.generate(0, week_body()).await.unwrap_err();
        assert!(matches!(err, RotaError::Validation(_)));

        let mut long = week_body();
        long.week_end_date = long.week_start_date + Duration::days(7);
        assert!(matches!(svc.generate(LOCATION, long).await, Err(RotaError::Validation(_))));

        let mut backwards = week_body();
        backwards.week_end_date = backwards.week_start_date - Duration::days(1);
        assert!(matches!(svc.generate(LOCATION, backwards).await, Err(RotaError::Validation(_))));

        let mut stray = week_body();
        stray
            .revenue_forecast
            .insert(stray.week_start_date + Duration::days(10), 50.0);
        assert!(matches!(svc.generate(LOCATION, stray).await, Err(RotaError::Validation(_))));

        let mut negative = week_body();
        negative.revenue_forecast.insert(negative.week_start_date, -1.0);
        assert!(matches!(svc.generate(LOCATION, negative).await, Err(RotaError::Validation(_))));

        assert!(store.snapshot().requests.is_empty());
    }

    #[tokio::test]
    async fn location_without_staff_is_missing_input() {
        let mut data = bar();
        data.staff.clear();
        let store = Arc::new(MemoryStore::new(data));
        let err = service(store.clone()).generate(LOCATION, week_body()).await.unwrap_err();
        assert!(matches!(err, RotaError::MissingInput(_)));
        assert!(store.snapshot().schedules.is_empty());
    }

    #[tokio::test]
    async fn no_shift_rules_surfaces_the_algorithm_error() {
        let mut data = bar();
        data.shift_rules[0].archived = true;
        let store = Arc::new(MemoryStore::new(data));
        let err = service(store).generate(LOCATION, week_body()).await.unwrap_err();
        assert!(matches!(err, RotaError::Algorithm(crate::rota::AlgorithmError::NoShiftRules)));
    }

    #[tokio::test]
    async fn fetch_failure_persists_nothing() {
        let store = Arc::new(MemoryStore::new(bar()));
        store.fail_on("list_shift_rules");
        let err = service(store.clone()).generate(LOCATION, week_body()).await.unwrap_err();
        match err {
            RotaError::Fetch { what, .. } => assert_eq!(what, "shift rules"),
            other => panic!("unexpected error: {other}"),
        }
        let data = store.snapshot();
        assert!(data.schedules.is_empty());
        assert!(data.shifts.is_empty());
        assert_eq!(data.requests[0].status, "draft");
    }

    #[tokio::test]
    async fn persist_failure_is_reported() {
        let store = Arc::new(MemoryStore::new(bar()));
        store.fail_on("save_schedule");
        let err = service(store.clone()).generate(LOCATION, week_body()).await.unwrap_err();
        assert!(matches!(err, RotaError::Persist(_)));
        assert!(store.snapshot().schedules.is_empty());
    }

    #[tokio::test]
    async fn missing_configuration_falls_back_to_defaults() {
        let mut data = bar();
        data.global_rules.clear();
        let store = Arc::new(MemoryStore::new(data));
        let svc = service(store);

        assert_eq!(svc.effective_global_rules(LOCATION).await.unwrap(), GlobalConstraints::default());
        assert_eq!(svc.effective_algorithm_config(LOCATION).await.unwrap(), AlgorithmConfig::default());
        let summary = svc.generate(LOCATION, week_body()).await.unwrap();
        assert_eq!(summary.wage_target.target_type, WageTargetType::Percent);
        assert_eq!(summary.assigned_count, 5);
    }

    #[tokio::test]
    async fn config_updates_are_validated() {
        let store = Arc::new(MemoryStore::new(bar()));
        let svc = service(store.clone());

        let bad = PutGlobalRules {
            wage_target_type: WageTargetType::Absolute,
            wage_target_value: 2000.0,
            max_shifts_per_week: 9,
            min_rest_hours_between_shifts: 11.0,
            max_consecutive_days_worked: 6,
        };
        assert!(matches!(svc.put_global_rules(LOCATION, &bad).await, Err(RotaError::Validation(_))));

        let good = PutGlobalRules { max_shifts_per_week: 4, ..bad };
        let saved = svc.put_global_rules(LOCATION, &good).await.unwrap();
        assert_eq!(saved.max_shifts_per_week, 4);
        assert_eq!(saved.wage_target_type, WageTargetType::Absolute);

        let bad_config = AlgorithmConfig {
            min_part_shift_hours: 8.0,
            max_part_shift_hours: 4.0,
            ..AlgorithmConfig::default()
        };
        assert!(matches!(
            svc.put_algorithm_config(LOCATION, &bad_config).await,
            Err(RotaError::Validation(_))
        ));
        let config = AlgorithmConfig { manager_weight: 0.0, ..AlgorithmConfig::default() };
        assert_eq!(svc.put_algorithm_config(LOCATION, &config).await.unwrap(), config);
        assert_eq!(store.snapshot().algorithm_settings.len(), 1);
    }

    #[tokio::test]
    async fn ranking_uses_evaluation_history() {
        let mut data = bar();
        data.staff.push(staff(2, 11.0, &[1]));
        data.evaluations.push(crate::models::StaffEvaluation { staff_id: 2, weighted_score: 90.0 });
        data.evaluations.push(crate::models::StaffEvaluation { staff_id: 2, weighted_score: 70.0 });
        let mut off = staff(3, 9.0, &[1]);
        off.available_for_rota = false;
        data.staff.push(off);

        let ranked = service(Arc::new(MemoryStore::new(data)))
            .staff_ranking(LOCATION)
            .await
            .unwrap();
        let ids: Vec<i64> = ranked.iter().map(|r| r.staff.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(close(ranked[0].score, 80.0));
    }

    #[tokio::test]
    async fn unknown_schedule_is_not_found() {
        let svc = service(Arc::new(MemoryStore::new(bar())));
        assert!(matches!(svc.schedule(42).await, Err(RotaError::NotFound(_))));
        assert!(matches!(svc.schedule_shifts(42).await, Err(RotaError::NotFound(_))));
    }
}
