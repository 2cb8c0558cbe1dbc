//! Configuration module
//!
//! Process-wide settings for the conversion service: HTTP server, storage backend
//! credentials and the converter invocation. Read once at startup; there is no hot reload.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 8000;
const CONVERSION_TIMEOUT_SECS: u64 = 60;
const PRESIGNED_URL_TTL_SECS: u64 = 3600;
const SOFFICE_PATH: &str = "soffice";

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub aws_region: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Conversion configuration
    pub soffice_path: String,
    pub conversion_timeout_secs: u64,
    pub presigned_url_ttl_secs: u64,
    pub temp_dir: PathBuf,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, when present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from an arbitrary key lookup. Does not validate.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let server_port = match var("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => SERVER_PORT,
        };

        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let storage_backend = match var("STORAGE_BACKEND") {
            Some(backend) => backend.parse()?,
            None => StorageBackend::S3,
        };

        let conversion_timeout_secs = var("CONVERSION_TIMEOUT_SECS")
            .map(|s| {
                s.trim()
                    .parse::<u64>()
                    .map_err(|_| anyhow::anyhow!("CONVERSION_TIMEOUT_SECS must be a number of seconds"))
            })
            .transpose()?
            .unwrap_or(CONVERSION_TIMEOUT_SECS);

        let presigned_url_ttl_secs = var("PRESIGNED_URL_TTL_SECS")
            .map(|s| {
                s.trim()
                    .parse::<u64>()
                    .map_err(|_| anyhow::anyhow!("PRESIGNED_URL_TTL_SECS must be a number of seconds"))
            })
            .transpose()?
            .unwrap_or(PRESIGNED_URL_TTL_SECS);

        Ok(Config {
            environment,
            server_port,
            cors_origins,
            storage_backend,
            s3_bucket: var("S3_BUCKET_NAME").or_else(|| var("S3_BUCKET")),
            s3_region: var("S3_REGION"),
            s3_endpoint: var("S3_ENDPOINT"),
            aws_region: var("AWS_REGION"),
            aws_access_key_id: var("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: var("AWS_SECRET_ACCESS_KEY"),
            local_storage_path: var("LOCAL_STORAGE_PATH"),
            local_storage_base_url: var("LOCAL_STORAGE_BASE_URL"),
            soffice_path: var("SOFFICE_PATH").unwrap_or_else(|| SOFFICE_PATH.to_string()),
            conversion_timeout_secs,
            presigned_url_ttl_secs,
            temp_dir: var("CONVERSION_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.conversion_timeout_secs == 0 {
            return Err(anyhow::anyhow!("CONVERSION_TIMEOUT_SECS cannot be 0"));
        }

        if self.presigned_url_ttl_secs == 0 {
            return Err(anyhow::anyhow!("PRESIGNED_URL_TTL_SECS cannot be 0"));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET_NAME must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region().is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Region for the S3 client: `S3_REGION`, falling back to `AWS_REGION`.
    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region
            .as_deref()
            .or(self.aws_region.as_deref())
    }

    pub fn conversion_timeout(&self) -> Duration {
        Duration::from_secs(self.conversion_timeout_secs)
    }

    pub fn presigned_url_ttl(&self) -> Duration {
        Duration::from_secs(self.presigned_url_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, anyhow::Error> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server_port, 8000);
        assert_eq!(config.storage_backend, StorageBackend::S3);
        assert_eq!(config.soffice_path, "soffice");
        assert_eq!(config.conversion_timeout(), Duration::from_secs(60));
        assert_eq!(config.presigned_url_ttl(), Duration::from_secs(3600));
        assert_eq!(config.temp_dir, env::temp_dir());
        assert!(!config.is_production());
    }

    #[test]
    fn s3_settings_are_read() {
        let config = config_from(&[
            ("S3_BUCKET_NAME", "converted-docs"),
            ("AWS_REGION", "eu-west-1"),
            ("AWS_ACCESS_KEY_ID", "AKIA"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
        ])
        .unwrap();
        assert_eq!(config.s3_bucket.as_deref(), Some("converted-docs"));
        assert_eq!(config.s3_region(), Some("eu-west-1"));
        assert_eq!(config.aws_access_key_id.as_deref(), Some("AKIA"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn s3_bucket_alias_is_accepted() {
        let config = config_from(&[("S3_BUCKET", "b"), ("S3_REGION", "us-east-1")]).unwrap();
        assert_eq!(config.s3_bucket.as_deref(), Some("b"));
        assert_eq!(config.s3_region(), Some("us-east-1"));
    }

    #[test]
    fn s3_backend_requires_bucket_and_region() {
        let config = config_from(&[("AWS_REGION", "eu-west-1")]).unwrap();
        assert!(config.validate().is_err());

        let config = config_from(&[("S3_BUCKET_NAME", "b")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn local_backend_requires_path_and_base_url() {
        let config = config_from(&[("STORAGE_BACKEND", "local")]).unwrap();
        assert!(config.validate().is_err());

        let config = config_from(&[
            ("STORAGE_BACKEND", "local"),
            ("LOCAL_STORAGE_PATH", "/var/lib/docpress"),
            ("LOCAL_STORAGE_BASE_URL", "http://localhost:8000/files"),
        ])
        .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("CONVERSION_TIMEOUT_SECS", "-1")]).is_err());
        assert!(config_from(&[("STORAGE_BACKEND", "ftp")]).is_err());
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let config = config_from(&[
            ("S3_BUCKET_NAME", "b"),
            ("AWS_REGION", "eu-west-1"),
            ("CONVERSION_TIMEOUT_SECS", "0"),
        ])
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn wildcard_cors_rejected_in_production() {
        let config = config_from(&[
            ("ENVIRONMENT", "production"),
            ("S3_BUCKET_NAME", "b"),
            ("AWS_REGION", "eu-west-1"),
        ])
        .unwrap();
        assert!(config.is_production());
        assert!(config.validate().is_err());

        let config = config_from(&[
            ("ENVIRONMENT", "prod"),
            ("CORS_ORIGINS", "https://app.example.com"),
            ("S3_BUCKET_NAME", "b"),
            ("AWS_REGION", "eu-west-1"),
        ])
        .unwrap();
        assert!(config.validate().is_ok());
    }
}
