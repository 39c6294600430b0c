// src/cost_client.rs
//
// Employer cost pricing, either in-process or through a remote calculator
// service that speaks the same camelCase JSON.

use std::time::Duration;

use anyhow::Result;
use tracing::warn;

use crate::rota::{calculate_employer_cost, CostCalculationResult, CostInput};

#[derive(Debug, Clone)]
pub enum EmployerCostCalculator {
    Local,
    Remote { client: reqwest::Client, url: String },
}

impl EmployerCostCalculator {
    /// `base` is the service root; requests go to `{base}/employer-cost`.
    pub fn remote(base: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::Remote {
            client,
            url: format!("{}/employer-cost", base.trim_end_matches('/')),
        })
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// Never fails: any remote problem falls back to the local model.
    pub async fn calculate(&self, input: &CostInput) -> CostCalculationResult {
        match self {
            Self::Local => calculate_employer_cost(input),
            Self::Remote { client, url } => match fetch(client, url, input).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(%url, error = %e, "remote cost calculator failed; using local model");
                    calculate_employer_cost(input)
                }
            },
        }
    }
}

async fn fetch(client: &reqwest::Client, url: &str, input: &CostInput) -> Result<CostCalculationResult> {
    let result = client
        .post(url)
        .json(input)
        .send()
        .await?
        .error_for_status()?
        .json::<CostCalculationResult>()
        .await?;
    Ok(result)
}
