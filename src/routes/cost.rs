// src/routes/cost.rs

use axum::{extract::{Query, State}, Json};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::rota::{cost::{hourly_rate_from_salary, STANDARD_HOURS_PER_DAY}, CostCalculationResult, CostInput};

#[derive(Deserialize)]
pub struct HourlyRateQ {
    pub annual_salary: f64,
    pub hours_per_day: Option<f64>,
}

#[derive(Serialize)]
pub struct HourlyRateResp { pub annual_salary: f64, pub hours_per_day: f64, pub hourly_rate: f64 }

/// POST /api/v1/employer-cost
pub async fn employer_cost(
    State(state): State<AppState>,
    Json(b): Json<CostInput>,
) -> Result<Json<CostCalculationResult>, (StatusCode, String)> {
    if !b.hours.is_finite() || b.hours < 0.0 {
        return Err((StatusCode::BAD_REQUEST, format!("hours must be a non-negative number, got {}", b.hours)));
    }
    let result = state.service.calculator().calculate(&b).await;
    Ok(Json(result))
}

/// GET /api/v1/hourly-rate?annual_salary=&hours_per_day=
pub async fn hourly_rate(
    Query(q): Query<HourlyRateQ>,
) -> Result<Json<HourlyRateResp>, (StatusCode, String)> {
    let hours_per_day = q.hours_per_day.unwrap_or(STANDARD_HOURS_PER_DAY);
    if !q.annual_salary.is_finite() || q.annual_salary < 0.0 {
        return Err((StatusCode::BAD_REQUEST, "annual_salary must be a non-negative number".into()));
    }
    if !hours_per_day.is_finite() || hours_per_day <= 0.0 {
        return Err((StatusCode::BAD_REQUEST, "hours_per_day must be positive".into()));
    }
    Ok(Json(HourlyRateResp {
        annual_salary: q.annual_salary,
        hours_per_day,
        hourly_rate: hourly_rate_from_salary(q.annual_salary, hours_per_day),
    }))
}
