//! Shared fixtures for API integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use docpress_api::{setup::routes::setup_routes, AppState};
use docpress_core::Config;
use docpress_processing::{
    ConversionError, ConversionOutput, ConversionPipeline, DocumentConverter, DocumentFetcher,
};
use docpress_storage::{Storage, StorageBackend, StorageError, StorageResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const FIXED_DOWNLOAD_URL: &str =
    "https://docpress-test.s3.amazonaws.com/converted/fixed.pdf?X-Amz-Signature=abc";

/// Writes a small fake document instead of downloading, or fails like a 404.
pub struct StubFetcher {
    pub fail: bool,
}

#[async_trait]
impl DocumentFetcher for StubFetcher {
    async fn fetch_to_file(&self, url: &str, destination: &Path) -> Result<u64, ConversionError> {
        if self.fail {
            return Err(ConversionError::DownloadFailed(format!(
                "HTTP status client error (404 Not Found) for url ({})",
                url
            )));
        }
        tokio::fs::write(destination, b"PK\x03\x04").await?;
        Ok(4)
    }
}

/// Writes `<stem>.pdf` next to the input, as the office suite does.
pub struct PdfWritingConverter;

#[async_trait]
impl DocumentConverter for PdfWritingConverter {
    async fn convert(
        &self,
        input_path: &Path,
        output_dir: &Path,
    ) -> Result<ConversionOutput, ConversionError> {
        let stem = input_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        tokio::fs::write(output_dir.join(format!("{}.pdf", stem)), b"%PDF-1.7").await?;
        Ok(ConversionOutput {
            success: true,
            exit_code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
            duration: Duration::from_millis(1),
        })
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Storage that accepts every upload and echoes a fixed presigned URL.
#[derive(Default)]
pub struct EchoStorage {
    pub fail_upload: bool,
}

#[async_trait]
impl Storage for EchoStorage {
    async fn upload_file(
        &self,
        _local_path: &Path,
        storage_key: &str,
        _content_type: &str,
    ) -> StorageResult<String> {
        if self.fail_upload {
            return Err(StorageError::UploadFailed(
                "The specified bucket does not exist".to_string(),
            ));
        }
        Ok(format!("https://docpress-test.s3.amazonaws.com/{}", storage_key))
    }

    async fn get_presigned_url(
        &self,
        _storage_key: &str,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        Ok(FIXED_DOWNLOAD_URL.to_string())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Job files currently present in the shared temp directory.
    pub fn job_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().contains("_input"))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Poll until the detached success cleanup has removed every job file.
    pub async fn wait_for_cleanup(&self) -> bool {
        for _ in 0..100 {
            if self.job_files().is_empty() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }
}

pub fn test_config(temp_dir: &Path) -> Config {
    let mut vars = HashMap::new();
    vars.insert("S3_BUCKET_NAME", "docpress-test".to_string());
    vars.insert("AWS_REGION", "us-east-1".to_string());
    vars.insert(
        "CONVERSION_TEMP_DIR",
        temp_dir.to_string_lossy().into_owned(),
    );
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

pub fn setup_test_app(
    fetcher: Arc<dyn DocumentFetcher>,
    converter: Arc<dyn DocumentConverter>,
    storage: Arc<dyn Storage>,
) -> TestApp {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = test_config(temp_dir.path());

    let pipeline = ConversionPipeline::new(
        fetcher,
        converter,
        storage,
        config.temp_dir.clone(),
        config.presigned_url_ttl(),
    );
    let state = Arc::new(AppState::new(config.clone(), pipeline));
    let app = setup_routes(&config, state).unwrap();

    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");
    TestApp { server, temp_dir }
}

/// Happy-path collaborators.
pub fn setup_default_app() -> TestApp {
    setup_test_app(
        Arc::new(StubFetcher { fail: false }),
        Arc::new(PdfWritingConverter),
        Arc::new(EchoStorage::default()),
    )
}

/// Executable shell script standing in for `soffice`.
#[cfg(unix)]
pub fn fake_soffice(dir: &Path, body: &str) -> String {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-soffice");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}
