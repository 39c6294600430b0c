// src/routes/rota.rs

use axum::{extract::{Path, State}, Json};
use axum::http::StatusCode;

use crate::{AppState, models::{GenerationSummary, RotaSchedule, ScheduledShift}};
use crate::error::rota_error;
use crate::service::GenerateRotaBody;

/// POST /api/v1/locations/:location_id/rota
pub async fn generate_rota(
    State(state): State<AppState>,
    Path(location_id): Path<i64>,
    Json(b): Json<GenerateRotaBody>,
) -> Result<Json<GenerationSummary>, (StatusCode, String)> {
    let summary = state.service.generate(location_id, b).await.map_err(rota_error)?;
    Ok(Json(summary))
}

/// GET /api/v1/locations/:location_id/rota-schedules
pub async fn list_schedules(
    State(state): State<AppState>,
    Path(location_id): Path<i64>,
) -> Result<Json<Vec<RotaSchedule>>, (StatusCode, String)> {
    let rows = state.service.schedules(location_id).await.map_err(rota_error)?;
    Ok(Json(rows))
}

/// GET /api/v1/rota-schedules/:id
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RotaSchedule>, (StatusCode, String)> {
    let row = state.service.schedule(id).await.map_err(rota_error)?;
    Ok(Json(row))
}

/// GET /api/v1/rota-schedules/:id/shifts
pub async fn list_schedule_shifts(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ScheduledShift>>, (StatusCode, String)> {
    let rows = state.service.schedule_shifts(id).await.map_err(rota_error)?;
    Ok(Json(rows))
}
