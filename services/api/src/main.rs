use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod models;
mod routes;
mod seed;
mod state;

use common::database::{DatabaseConfig, init_pool};
use progress::{Storage, postgres::PgRepository};
use tokio::net::TcpListener;

use crate::{
    config::{AppConfig, StorageBackend},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting API service");

    let config = AppConfig::from_env().context("Invalid service configuration")?;

    let (storage, pool) = match config.storage {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = init_pool(&db_config).await?;

            // Check database connectivity
            if common::database::health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }

            PgRepository::new(pool.clone()).migrate().await?;
            (Storage::postgres(pool.clone()), Some(pool))
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on shutdown");
            (Storage::in_memory(), None)
        }
    };

    let app_state = AppState::new(storage, pool.clone());

    if let Some(path) = &config.seed_path {
        seed::seed_catalog(&app_state.catalog, Path::new(path)).await?;
    }

    let allowed_origins = config
        .allowed_origins()
        .context("Invalid QF_CORS_ORIGINS")?;
    let app = routes::create_router(app_state, allowed_origins);

    let addr = config.bind_addr().context("Invalid QF_HOST/QF_PORT")?;
    let listener = TcpListener::bind(addr).await?;
    info!("API service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        pool.close().await;
        info!("Database pool closed");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
