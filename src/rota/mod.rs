// src/rota/mod.rs
//
// Scheduling core: cost model, candidate ranking, demand expansion and the
// greedy assignment pass. Pure and synchronous; no I/O.

use chrono::NaiveDate;

pub mod algorithm;
pub mod config;
pub mod constraints;
pub mod cost;
pub mod demand;
pub mod model;
pub mod ranking;
pub mod roles;

pub use algorithm::{RotaSchedulingAlgorithm, RotaWeek};
pub use config::{AlgorithmConfig, GlobalConstraints, WageTargetType};
pub use cost::{calculate_employer_cost, CostCalculationResult, CostInput, EmploymentType};
pub use model::{GeneratedSchedule, PlannedShift, StaffMember};

#[derive(Debug, thiserror::Error)]
pub enum AlgorithmError {
    #[error("location id is required")]
    MissingLocation,
    #[error("week {start}..{end} must span one to seven days")]
    InvalidWeek { start: NaiveDate, end: NaiveDate },
    #[error("no active shift rules for this location")]
    NoShiftRules,
    #[error("invalid global constraints: {0}")]
    InvalidConstraints(String),
    #[error("invalid algorithm config: {0}")]
    InvalidConfig(String),
}
