// src/db/mod.rs

use anyhow::Context;
use sqlx::{Pool, Postgres};
use tracing::info;

use crate::config::Settings;

pub async fn connect(settings: &Settings) -> anyhow::Result<Pool<Postgres>> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.database_max_connections)
        .connect(&settings.database_url)
        .await
        .context("connecting to PostgreSQL")?;
    info!(max_connections = settings.database_max_connections, "connected to PostgreSQL");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("running database migrations")?;
    info!("database migrations applied");

    Ok(pool)
}
