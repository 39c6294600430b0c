// src/rota/ranking.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::config::AlgorithmConfig;
use super::cost::EmploymentType;
use super::model::{StaffId, StaffMember};
use super::roles::RoleCatalog;

/// One historical performance evaluation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffEvaluation {
    pub staff_id: StaffId,
    pub weighted_score: f64,
}

/// Mean `weighted_score` per staff member. Staff without rows are absent;
/// callers treat that as 0.
pub fn hi_scores(evaluations: &[StaffEvaluation]) -> BTreeMap<StaffId, f64> {
    let mut sums: BTreeMap<StaffId, (f64, u32)> = BTreeMap::new();
    for e in evaluations.iter().filter(|e| e.weighted_score.is_finite()) {
        let entry = sums.entry(e.staff_id).or_insert((0.0, 0));
        entry.0 += e.weighted_score;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(id, (sum, n))| (id, sum / f64::from(n)))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    pub staff: StaffMember,
    pub score: f64,
    pub is_manager: bool,
}

pub fn priority_score(staff: &StaffMember, is_manager: bool, config: &AlgorithmConfig) -> f64 {
    let mut score = config.hi_score_weight * staff.hi_score;
    if staff.employment_type == EmploymentType::Salaried {
        score += config.salaried_weight;
    }
    if is_manager {
        score += config.manager_weight;
    }
    score
}

/// Highest composite score first; equal scores fall back to ascending id so
/// the order is reproducible.
pub fn rank_candidates(
    staff: &[StaffMember],
    config: &AlgorithmConfig,
    roles: &RoleCatalog,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = staff
        .iter()
        .map(|s| {
            let is_manager = roles.is_manager(s);
            RankedCandidate {
                score: priority_score(s, is_manager, config),
                is_manager,
                staff: s.clone(),
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.staff.id.cmp(&b.staff.id))
    });
    ranked
}
