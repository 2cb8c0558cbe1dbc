//! Best-effort removal of per-job temporary files.

use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Remove `path` if it exists. Returns whether a file was removed.
///
/// Never fails: a missing file is the expected case, anything else is logged.
pub async fn remove_if_exists(path: &Path) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Removed temporary file");
            true
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove temporary file");
            false
        }
    }
}

/// Removal of a job's files after its response has been sent.
///
/// Consumed by [`DeferredCleanup::spawn`] or [`DeferredCleanup::run`], so it runs at most once.
#[derive(Debug)]
pub struct DeferredCleanup {
    job_id: Uuid,
    paths: Vec<PathBuf>,
}

impl DeferredCleanup {
    pub fn new(job_id: Uuid, paths: Vec<PathBuf>) -> Self {
        Self { job_id, paths }
    }

    pub async fn run(self) -> usize {
        let mut removed = 0;
        for path in &self.paths {
            if remove_if_exists(path).await {
                removed += 1;
            }
        }
        tracing::debug!(job_id = %self.job_id, removed, "Deferred cleanup finished");
        removed
    }

    /// Detach the cleanup onto the runtime. The caller does not wait for it.
    pub fn spawn(self) -> tokio::task::JoinHandle<usize> {
        tokio::spawn(self.run())
    }
}
