//! Application state shared by every handler.

use docpress_core::Config;
use docpress_processing::ConversionPipeline;

/// Constructed once at startup and shared as `Arc<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: ConversionPipeline,
}

impl AppState {
    pub fn new(config: Config, pipeline: ConversionPipeline) -> Self {
        Self { config, pipeline }
    }
}
