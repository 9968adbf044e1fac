//! Application setup and initialization
//!
//! Startup is split into steps so tests can build the router without a
//! live database or network services.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use crate::telemetry::LogFormat;
use anyhow::{Context, Result};
use std::sync::Arc;
use timber_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(LogFormat::from_env(), config.environment())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;

    let state = services::initialize_services(&config, pool)?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
