// src/routes/global_rules.rs

use axum::{extract::{Path, State}, Json};
use axum::http::StatusCode;

use crate::{AppState, models::PutGlobalRules, rota::GlobalConstraints};
use crate::error::rota_error;

/// GET /api/v1/locations/:location_id/global-rules
///
/// Returns the defaults when nothing has been stored for the location.
pub async fn get_global_rules(
    State(state): State<AppState>,
    Path(location_id): Path<i64>,
) -> Result<Json<GlobalConstraints>, (StatusCode, String)> {
    let rules = state.service.effective_global_rules(location_id).await.map_err(rota_error)?;
    Ok(Json(rules))
}

/// PUT /api/v1/locations/:location_id/global-rules
pub async fn put_global_rules(
    State(state): State<AppState>,
    Path(location_id): Path<i64>,
    Json(b): Json<PutGlobalRules>,
) -> Result<Json<GlobalConstraints>, (StatusCode, String)> {
    let rules = state.service.put_global_rules(location_id, &b).await.map_err(rota_error)?;
    Ok(Json(rules))
}
