//! Conversion pipeline errors.

use docpress_core::AppError;
use thiserror::Error;

/// Failure of one conversion job, classified by the stage that failed.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The source document could not be fetched or written to disk.
    #[error("{0}")]
    DownloadFailed(String),

    /// The converter did not finish within its wall-clock budget and was killed.
    #[error("Conversion timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The converter exited non-zero, or exited zero without producing the PDF.
    #[error("{0}")]
    ConversionFailed(String),

    /// Uploading the PDF or presigning its download URL failed.
    #[error("{0}")]
    UploadFailed(String),

    #[error("{0}")]
    Unexpected(String),
}

impl ConversionError {
    pub fn kind(&self) -> &'static str {
        match self {
            ConversionError::DownloadFailed(_) => "DownloadFailed",
            ConversionError::Timeout { .. } => "Timeout",
            ConversionError::ConversionFailed(_) => "ConversionFailed",
            ConversionError::UploadFailed(_) => "UploadFailed",
            ConversionError::Unexpected(_) => "Unexpected",
        }
    }

    /// Whether the job's output PDF may exist when this error is raised and must be removed too.
    pub fn removes_output(&self) -> bool {
        !matches!(self, ConversionError::DownloadFailed(_))
    }
}

impl From<std::io::Error> for ConversionError {
    fn from(err: std::io::Error) -> Self {
        ConversionError::Unexpected(err.to_string())
    }
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::DownloadFailed(msg) => AppError::DownloadFailed(msg),
            ConversionError::Timeout { seconds } => AppError::ConversionTimeout { seconds },
            ConversionError::ConversionFailed(msg) => AppError::ConversionFailed(msg),
            ConversionError::UploadFailed(msg) => AppError::UploadFailed(msg),
            ConversionError::Unexpected(msg) => AppError::Internal(msg),
        }
    }
}
