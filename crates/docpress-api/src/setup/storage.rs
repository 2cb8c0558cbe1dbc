//! Storage setup and initialization

use anyhow::{Context, Result};
use docpress_core::Config;
use docpress_storage::{create_storage, Storage};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!(backend = %config.storage_backend, "Initializing storage...");
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;
    tracing::info!(
        backend = ?storage.backend_type(),
        "Storage initialized successfully"
    );

    Ok(storage)
}
