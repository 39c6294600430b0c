// src/rota/config.rs

use serde::{Deserialize, Serialize};

use super::AlgorithmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WageTargetType {
    #[default]
    Percent,
    Absolute,
    Hours,
}

impl WageTargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WageTargetType::Percent => "percent",
            WageTargetType::Absolute => "absolute",
            WageTargetType::Hours => "hours",
        }
    }
}

impl std::str::FromStr for WageTargetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "percent" => Ok(WageTargetType::Percent),
            "absolute" => Ok(WageTargetType::Absolute),
            "hours" => Ok(WageTargetType::Hours),
            other => Err(format!("invalid wage target type: {other}")),
        }
    }
}

/// Legal and commercial limits for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConstraints {
    pub wage_target_type: WageTargetType,
    pub wage_target_value: f64,
    pub max_shifts_per_week: u32,
    pub min_rest_hours_between_shifts: f64,
    pub max_consecutive_days_worked: u32,
}

impl Default for GlobalConstraints {
    fn default() -> Self {
        Self {
            wage_target_type: WageTargetType::Percent,
            wage_target_value: 30.0,
            max_shifts_per_week: 5,
            min_rest_hours_between_shifts: 11.0,
            max_consecutive_days_worked: 6,
        }
    }
}

impl GlobalConstraints {
    pub const MAX_SHIFTS_PER_WEEK_LIMIT: u32 = 7;
    pub const MIN_REST_HOURS_FLOOR: f64 = 8.0;

    pub fn validate(&self) -> Result<(), AlgorithmError> {
        let invalid = |msg: String| Err(AlgorithmError::InvalidConstraints(msg));

        if !self.wage_target_value.is_finite() || self.wage_target_value < 0.0 {
            return invalid(format!(
                "wage_target_value must be a non-negative number, got {}",
                self.wage_target_value
            ));
        }
        if self.max_shifts_per_week > Self::MAX_SHIFTS_PER_WEEK_LIMIT {
            return invalid(format!(
                "max_shifts_per_week must be at most {}, got {}",
                Self::MAX_SHIFTS_PER_WEEK_LIMIT,
                self.max_shifts_per_week
            ));
        }
        if !self.min_rest_hours_between_shifts.is_finite()
            || self.min_rest_hours_between_shifts < Self::MIN_REST_HOURS_FLOOR
        {
            return invalid(format!(
                "min_rest_hours_between_shifts must be at least {}, got {}",
                Self::MIN_REST_HOURS_FLOOR,
                self.min_rest_hours_between_shifts
            ));
        }
        Ok(())
    }
}

/// Candidate ranking weights and part-shift bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmConfig {
    pub salaried_weight: f64,
    pub manager_weight: f64,
    pub hi_score_weight: f64,
    pub enable_part_shifts: bool,
    pub min_part_shift_hours: f64,
    pub max_part_shift_hours: f64,
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self {
            salaried_weight: 10.0,
            manager_weight: 5.0,
            hi_score_weight: 1.0,
            enable_part_shifts: false,
            min_part_shift_hours: 4.0,
            max_part_shift_hours: 6.0,
        }
    }
}

impl AlgorithmConfig {
    pub fn validate(&self) -> Result<(), AlgorithmError> {
        let invalid = |msg: String| Err(AlgorithmError::InvalidConfig(msg));

        for (name, w) in [
            ("salariedWeight", self.salaried_weight),
            ("managerWeight", self.manager_weight),
            ("hiScoreWeight", self.hi_score_weight),
        ] {
            if !w.is_finite() || w < 0.0 {
                return invalid(format!("{name} must be a non-negative number, got {w}"));
            }
        }

        let (min, max) = (self.min_part_shift_hours, self.max_part_shift_hours);
        if !(min.is_finite() && max.is_finite()) || min <= 0.0 || min > max || max > 24.0 {
            return invalid(format!(
                "part shift hours must satisfy 0 < min <= max <= 24, got {min}..{max}"
            ));
        }
        Ok(())
    }
}
