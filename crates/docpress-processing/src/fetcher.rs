//! Source document download.

use crate::error::ConversionError;
use async_trait::async_trait;
use futures::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Fetches a remote document onto the local filesystem.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Download `url` into `destination`, returning the number of bytes written.
    ///
    /// Non-success HTTP statuses are failures. A partially written `destination` may be left
    /// behind on error; the caller owns its removal.
    async fn fetch_to_file(&self, url: &str, destination: &Path) -> Result<u64, ConversionError>;
}

/// `reqwest`-backed fetcher that streams the body to disk chunk by chunk.
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        HttpFetcher { client }
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch_to_file(&self, url: &str, destination: &Path) -> Result<u64, ConversionError> {
        let start = std::time::Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ConversionError::DownloadFailed(e.to_string()))?;

        let mut file = tokio::fs::File::create(destination).await.map_err(|e| {
            ConversionError::DownloadFailed(format!(
                "Failed to create {}: {}",
                destination.display(),
                e
            ))
        })?;

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ConversionError::DownloadFailed(e.to_string()))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| ConversionError::DownloadFailed(e.to_string()))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| ConversionError::DownloadFailed(e.to_string()))?;

        tracing::debug!(
            url = %url,
            path = %destination.display(),
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Source document downloaded"
        );

        Ok(written)
    }
}
