//! Configuration validation
//!
//! Checks that need the filesystem, on top of [`Config::validate`].

use anyhow::{anyhow, Context, Result};
use docpress_core::Config;
use std::path::Path;

pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;
    validate_temp_dir(&config.temp_dir)?;

    if config.presigned_url_ttl_secs > 7 * 24 * 3600 {
        tracing::warn!(
            presigned_url_ttl_secs = config.presigned_url_ttl_secs,
            "PRESIGNED_URL_TTL_SECS exceeds the S3 maximum of 7 days"
        );
    }

    Ok(())
}

/// The shared temp directory must exist (it is created if missing) and be a directory.
pub fn validate_temp_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create temp directory {}", dir.display()))?;

    let metadata = std::fs::metadata(dir)
        .with_context(|| format!("Failed to stat temp directory {}", dir.display()))?;
    if !metadata.is_dir() {
        return Err(anyhow!("{} is not a directory", dir.display()));
    }

    Ok(())
}
