//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod services;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use docpress_core::Config;
use docpress_infra::LogFormat;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    docpress_infra::init_telemetry(
        env!("CARGO_PKG_NAME"),
        &config.environment,
        LogFormat::from_env(),
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    validation::validate_config(&config).context("Configuration validation failed")?;

    tracing::info!("Configuration loaded and validated successfully");

    let storage = storage::setup_storage(&config).await?;

    let state = services::initialize_services(&config, storage)?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
