// src/routes/mod.rs

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub mod algorithm_config;
pub mod cost;
pub mod global_rules;
pub mod health;
pub mod ranking;
pub mod rota;

/// Root API router; middleware layers are added by the caller.
pub fn router(state: AppState) -> Router {
    Router::new()
        // health
        .route("/health", get(health::health))
        // rota generation + schedules
        .route("/api/v1/locations/:location_id/rota", post(rota::generate_rota))
        .route(
            "/api/v1/locations/:location_id/rota-schedules",
            get(rota::list_schedules),
        )
        .route("/api/v1/rota-schedules/:id", get(rota::get_schedule))
        .route(
            "/api/v1/rota-schedules/:id/shifts",
            get(rota::list_schedule_shifts),
        )
        // per-location configuration
        .route(
            "/api/v1/locations/:location_id/global-rules",
            get(global_rules::get_global_rules).put(global_rules::put_global_rules),
        )
        .route(
            "/api/v1/locations/:location_id/algorithm-config",
            get(algorithm_config::get_algorithm_config)
                .put(algorithm_config::put_algorithm_config),
        )
        // cost model
        .route("/api/v1/employer-cost", post(cost::employer_cost))
        .route("/api/v1/hourly-rate", get(cost::hourly_rate))
        // ranking
        .route(
            "/api/v1/locations/:location_id/staff-ranking",
            get(ranking::staff_ranking),
        )
        .with_state(state)
}
