// src/config.rs

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub port: u16,
    pub database_max_connections: u32,
    pub cost_calculator_url: Option<String>,
    pub cost_calculator_timeout: Duration,
}

fn parsed<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

impl Settings {
    /// Reads the process environment; call `dotenvy::dotenv()` first to pick
    /// up a local `.env`.
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .context("DATABASE_URL must be set (environment or .env file)")?;

        let cost_calculator_url = env::var("COST_CALCULATOR_URL")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            database_url,
            port: parsed("PORT", 8080)?,
            database_max_connections: parsed("DATABASE_MAX_CONNECTIONS", 10)?,
            cost_calculator_url,
            cost_calculator_timeout: Duration::from_secs(parsed("COST_CALCULATOR_TIMEOUT_SECS", 5)?),
        })
    }
}
