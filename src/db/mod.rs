// src/db/mod.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use crate::config::DatabaseConfig;

pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<Pool<Postgres>> {
    let options = cfg.connect_options()?;

    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(cfg.connect_timeout)
        .connect_with(options)
        .await
        .context("failed to connect to PostgreSQL")?;

    tracing::info!(max_connections = cfg.max_connections, "connected to PostgreSQL");
    Ok(pool)
}
