// src/main.rs

use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod cost_client;
mod db;
mod error;
mod models;
mod rota;
mod routes;
mod service;
mod store;

use config::Settings;
use cost_client::EmployerCostCalculator;
use service::RotaService;
use store::PgStore;

#[derive(Clone)]
pub struct AppState {
    pub service: RotaService,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;

    // Initialize DB pool (+ migrations)
    let pool = db::connect(&settings).await?;

    let calculator = match &settings.cost_calculator_url {
        Some(url) => {
            info!(%url, "pricing shifts through remote cost calculator");
            EmployerCostCalculator::remote(url, settings.cost_calculator_timeout)?
        }
        None => EmployerCostCalculator::Local,
    };

    let state = AppState {
        service: RotaService::new(Arc::new(PgStore::new(pool)), Arc::new(calculator)),
    };

    // Very permissive CORS for local dev (tighten for prod)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", settings.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "rota API listening");

    axum::serve(listener, api.into_make_service()).await?;
    Ok(())
}
