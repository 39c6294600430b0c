// src/rota/cost.rs

use serde::{Deserialize, Serialize};

// 365 days less two days off a week over 52 weeks.
pub const WORKING_DAYS_PER_YEAR: f64 = 261.0;
pub const STANDARD_HOURS_PER_DAY: f64 = 8.0;

/// Weekly secondary threshold, applied per shift.
pub const NI_WEEKLY_THRESHOLD: f64 = 175.0;
pub const NI_RATE: f64 = 0.138;
/// Minimum employer auto-enrolment contribution.
pub const PENSION_RATE: f64 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmploymentType {
    #[default]
    Hourly,
    Salaried,
    Contractor,
}

impl EmploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::Hourly => "hourly",
            EmploymentType::Salaried => "salaried",
            EmploymentType::Contractor => "contractor",
        }
    }
}

// Unknown labels price as hourly.
impl From<&str> for EmploymentType {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "salaried" => EmploymentType::Salaried,
            "contractor" => EmploymentType::Contractor,
            _ => EmploymentType::Hourly,
        }
    }
}

/// Everything needed to price one worked shift.
///
/// Field names follow the camelCase wire shape of the cost RPC so the same
/// value can be posted to a remote calculator unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostInput {
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    pub hours: f64,
    #[serde(default, deserialize_with = "lenient_employment_type")]
    pub employment_type: EmploymentType,
    #[serde(default)]
    pub is_full_time_student: bool,
    #[serde(default)]
    pub annual_salary: Option<f64>,
    #[serde(default)]
    pub contractor_rate: Option<f64>,
}

fn lenient_employment_type<'de, D>(d: D) -> Result<EmploymentType, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw.as_deref().map(EmploymentType::from).unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostCalculationResult {
    pub basic_pay: f64,
    pub ni_cost: f64,
    pub pension_cost: f64,
    pub total_cost: f64,
}

impl CostCalculationResult {
    pub fn accumulate(&mut self, other: &CostCalculationResult) {
        self.basic_pay += other.basic_pay;
        self.ni_cost += other.ni_cost;
        self.pension_cost += other.pension_cost;
        self.total_cost += other.total_cost;
    }
}

fn rate(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Employer cost of a single worked shift: basic pay plus employer NI and
/// pension.
///
/// Contractors and full-time students never attract NI or pension. NI is
/// charged on pay above [`NI_WEEKLY_THRESHOLD`] for this shift alone, not on
/// the week's aggregate pay.
pub fn calculate_employer_cost(input: &CostInput) -> CostCalculationResult {
    if !input.hours.is_finite() || input.hours <= 0.0 {
        return CostCalculationResult::default();
    }

    let basic_pay = match input.employment_type {
        EmploymentType::Salaried => {
            rate(input.annual_salary) / WORKING_DAYS_PER_YEAR / STANDARD_HOURS_PER_DAY * input.hours
        }
        EmploymentType::Contractor => rate(input.contractor_rate) * input.hours,
        EmploymentType::Hourly => rate(input.hourly_rate) * input.hours,
    };

    let eligible =
        input.employment_type != EmploymentType::Contractor && !input.is_full_time_student;

    let (ni_cost, pension_cost) = if eligible {
        let ni = if basic_pay > NI_WEEKLY_THRESHOLD {
            (basic_pay - NI_WEEKLY_THRESHOLD) * NI_RATE
        } else {
            0.0
        };
        (ni, basic_pay * PENSION_RATE)
    } else {
        (0.0, 0.0)
    };

    CostCalculationResult {
        basic_pay,
        ni_cost,
        pension_cost,
        total_cost: basic_pay + ni_cost + pension_cost,
    }
}

pub fn hourly_rate_from_salary(annual_salary: f64, hours_per_day: f64) -> f64 {
    if hours_per_day <= 0.0 {
        return 0.0;
    }
    annual_salary / WORKING_DAYS_PER_YEAR / hours_per_day
}
