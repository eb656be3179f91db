// src/main.rs

use axum::{routing::get, Router};
use sqlx::{Pool, Postgres};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

mod config;
mod db;
mod models;
mod queries;
mod reshape;
mod routes;
mod sankey;

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool<Postgres>,
    pub latest_year: i32,
}

pub fn app(state: AppState) -> Router {
    // Public read-only API: any origin may call it
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // health
        .route("/health", get(routes::health::health))
        // central programs
        .route("/api/central-programs", get(routes::central_programs::list_programs))
        .route(
            "/api/central-programs/resources",
            get(routes::central_programs::list_resources),
        )
        .route(
            "/api/central-programs/sankey",
            get(routes::central_programs::program_sankey),
        )
        .route(
            "/api/central-programs/overview",
            get(routes::central_programs::overview),
        )
        // district-wide
        .route("/api/sankey", get(routes::sankey::district_sankey))
        // state & middleware
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let pool = db::connect(&cfg.database).await?;
    let state = AppState { pool, latest_year: cfg.latest_year };

    let addr = format!("0.0.0.0:{}", cfg.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, latest_year = cfg.latest_year, "API listening");

    axum::serve(listener, app(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
