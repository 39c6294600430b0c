// src/routes/algorithm_config.rs

use axum::{extract::{Path, State}, Json};
use axum::http::StatusCode;

use crate::{AppState, rota::AlgorithmConfig};
use crate::error::rota_error;

/// GET /api/v1/locations/:location_id/algorithm-config
pub async fn get_algorithm_config(
    State(state): State<AppState>,
    Path(location_id): Path<i64>,
) -> Result<Json<AlgorithmConfig>, (StatusCode, String)> {
    let config = state.service.effective_algorithm_config(location_id).await.map_err(rota_error)?;
    Ok(Json(config))
}

/// PUT /api/v1/locations/:location_id/algorithm-config
pub async fn put_algorithm_config(
    State(state): State<AppState>,
    Path(location_id): Path<i64>,
    Json(b): Json<AlgorithmConfig>,
) -> Result<Json<AlgorithmConfig>, (StatusCode, String)> {
    let config = state.service.put_algorithm_config(location_id, &b).await.map_err(rota_error)?;
    Ok(Json(config))
}
