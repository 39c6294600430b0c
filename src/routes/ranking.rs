// src/routes/ranking.rs

use axum::{extract::{Path, State}, Json};
use axum::http::StatusCode;
use serde::Serialize;

use crate::AppState;
use crate::error::rota_error;
use crate::rota::EmploymentType;

#[derive(Serialize)]
pub struct RankingRow {
    pub rank: usize,
    pub staff_id: i64,
    pub full_name: String,
    pub employment_type: EmploymentType,
    pub hi_score: f64,
    pub is_manager: bool,
    pub score: f64,
}

/// GET /api/v1/locations/:location_id/staff-ranking
pub async fn staff_ranking(
    State(state): State<AppState>,
    Path(location_id): Path<i64>,
) -> Result<Json<Vec<RankingRow>>, (StatusCode, String)> {
    let ranked = state.service.staff_ranking(location_id).await.map_err(rota_error)?;
    let rows = ranked
        .into_iter()
        .enumerate()
        .map(|(i, r)| RankingRow {
            rank: i + 1,
            staff_id: r.staff.id,
            full_name: r.staff.full_name(),
            employment_type: r.staff.employment_type,
            hi_score: r.staff.hi_score,
            is_manager: r.is_manager,
            score: r.score,
        })
        .collect();
    Ok(Json(rows))
}
