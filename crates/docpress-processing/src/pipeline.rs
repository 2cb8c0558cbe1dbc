//! Conversion pipeline orchestration.
//!
//! One call to [`ConversionPipeline::convert`] is one job:
//!
//! 1. derive the job id, temp paths and storage key
//! 2. download the source into `<tmp>/<job_id>_input<ext>`
//! 3. run the converter with a hard timeout
//! 4. check that `<tmp>/<job_id>_input.pdf` exists
//! 5. upload it to `converted/<job_id>.pdf`
//! 6. presign a GET URL for it
//!
//! On failure the job's files are removed before the error is returned. On success the removal
//! is detached onto the runtime and the response does not wait for it.

use crate::cleanup::{remove_if_exists, DeferredCleanup};
use crate::converter::DocumentConverter;
use crate::error::ConversionError;
use crate::fetcher::DocumentFetcher;
use crate::job::ConversionJob;
use docpress_storage::Storage;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A successfully converted and uploaded document.
#[derive(Debug, Clone)]
pub struct ConvertedDocument {
    pub job_id: Uuid,
    pub storage_key: String,
    pub download_url: String,
}

#[derive(Clone)]
pub struct ConversionPipeline {
    fetcher: Arc<dyn DocumentFetcher>,
    converter: Arc<dyn DocumentConverter>,
    storage: Arc<dyn Storage>,
    temp_dir: PathBuf,
    url_ttl: Duration,
}

impl ConversionPipeline {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        converter: Arc<dyn DocumentConverter>,
        storage: Arc<dyn Storage>,
        temp_dir: PathBuf,
        url_ttl: Duration,
    ) -> Self {
        Self {
            fetcher,
            converter,
            storage,
            temp_dir,
            url_ttl,
        }
    }

    pub fn converter(&self) -> &Arc<dyn DocumentConverter> {
        &self.converter
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    #[tracing::instrument(skip(self), fields(job_id = tracing::field::Empty))]
    pub async fn convert(&self, input_url: &str) -> Result<ConvertedDocument, ConversionError> {
        let job = ConversionJob::new(input_url, &self.temp_dir);
        tracing::Span::current().record("job_id", tracing::field::display(job.job_id()));
        let start = Instant::now();

        match self.run(&job).await {
            Ok(document) => {
                DeferredCleanup::new(
                    job.job_id(),
                    vec![job.input_path().to_path_buf(), job.output_path().to_path_buf()],
                )
                .spawn();

                tracing::info!(
                    storage_key = %document.storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Document converted"
                );
                Ok(document)
            }
            Err(err) => {
                remove_if_exists(job.input_path()).await;
                if err.removes_output() {
                    remove_if_exists(job.output_path()).await;
                }

                tracing::warn!(
                    error_kind = err.kind(),
                    error = %err,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Document conversion job failed"
                );
                Err(err)
            }
        }
    }

    async fn run(&self, job: &ConversionJob) -> Result<ConvertedDocument, ConversionError> {
        self.fetcher
            .fetch_to_file(job.input_url(), job.input_path())
            .await?;

        let output = self
            .converter
            .convert(job.input_path(), job.output_dir())
            .await?;

        if !output.success {
            tracing::error!(
                exit_code = ?output.exit_code,
                duration_ms = output.duration.as_secs_f64() * 1000.0,
                stderr = %output.stderr,
                "Converter exited with failure"
            );
            return Err(ConversionError::ConversionFailed(
                "Document conversion failed".to_string(),
            ));
        }

        tracing::debug!(
            exit_code = ?output.exit_code,
            duration_ms = output.duration.as_secs_f64() * 1000.0,
            "Converter succeeded"
        );

        // The converter can exit 0 without writing anything.
        if !tokio::fs::try_exists(job.output_path()).await? {
            tracing::error!(
                path = %job.output_path().display(),
                stdout = %output.stdout,
                stderr = %output.stderr,
                "Converter produced no output"
            );
            return Err(ConversionError::ConversionFailed(
                "Conversion failed, output file not found".to_string(),
            ));
        }

        self.storage
            .upload_file(job.output_path(), job.storage_key(), PDF_CONTENT_TYPE)
            .await
            .map_err(|e| ConversionError::UploadFailed(e.to_string()))?;

        let download_url = self
            .storage
            .get_presigned_url(job.storage_key(), self.url_ttl)
            .await
            .map_err(|e| ConversionError::UploadFailed(e.to_string()))?;

        Ok(ConvertedDocument {
            job_id: job.job_id(),
            storage_key: job.storage_key().to_string(),
            download_url,
        })
    }
}
