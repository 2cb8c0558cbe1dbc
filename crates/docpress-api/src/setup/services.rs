//! Conversion pipeline wiring

use crate::state::AppState;
use anyhow::{Context, Result};
use docpress_core::Config;
use docpress_processing::{ConversionPipeline, DocumentConverter, HttpFetcher, SofficeConverter};
use docpress_storage::Storage;
use std::sync::Arc;

/// Build the pipeline collaborators from configuration.
///
/// A missing converter is only a warning: the service still starts and conversions fail at
/// request time.
pub fn initialize_services(config: &Config, storage: Arc<dyn Storage>) -> Result<Arc<AppState>> {
    let converter = SofficeConverter::new(config.soffice_path.clone(), config.conversion_timeout())
        .context("Failed to configure document converter")?;

    match converter.resolve() {
        Some(path) => tracing::info!(
            converter = %path.display(),
            timeout_secs = config.conversion_timeout_secs,
            "Document converter found"
        ),
        None => tracing::warn!(
            converter = %converter.binary(),
            "Document converter not found in PATH. Conversion will fail."
        ),
    }

    let converter: Arc<dyn DocumentConverter> = Arc::new(converter);
    let pipeline = ConversionPipeline::new(
        Arc::new(HttpFetcher::new()),
        converter,
        storage,
        config.temp_dir.clone(),
        config.presigned_url_ttl(),
    );

    Ok(Arc::new(AppState::new(config.clone(), pipeline)))
}
