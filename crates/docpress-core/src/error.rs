//! Error types module
//!
//! `AppError` is the service-level failure taxonomy. Every failure of a conversion request
//! is classified into one of these variants before it reaches the HTTP boundary, where the
//! `ErrorMetadata` impl decides the status code, the log level and the `detail` text shown
//! to the caller.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like malformed requests
    Debug,
    /// Warning level - for failures caused by the caller's input document
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "CONVERSION_TIMEOUT")
    fn error_code(&self) -> &'static str;

    /// Client-facing message, rendered as the `detail` field
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Conversion timed out after {seconds}s")]
    ConversionTimeout { seconds: u64 },

    #[error("Conversion failed: {0}")]
    ConversionFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, LogLevel) {
    match err {
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", LogLevel::Debug),
        AppError::DownloadFailed(_) => (500, "DOWNLOAD_FAILED", LogLevel::Warn),
        AppError::ConversionTimeout { .. } => (504, "CONVERSION_TIMEOUT", LogLevel::Error),
        AppError::ConversionFailed(_) => (500, "CONVERSION_FAILED", LogLevel::Warn),
        AppError::UploadFailed(_) => (500, "UPLOAD_FAILED", LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "INTERNAL_ERROR", LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for logging
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::DownloadFailed(_) => "DownloadFailed",
            AppError::ConversionTimeout { .. } => "Timeout",
            AppError::ConversionFailed(_) => "ConversionFailed",
            AppError::UploadFailed(_) => "UploadFailed",
            AppError::Internal(_) => "Unexpected",
            AppError::InternalWithSource { .. } => "Unexpected",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::DownloadFailed(ref msg) => msg.clone(),
            AppError::ConversionTimeout { .. } => "Conversion timed out".to_string(),
            AppError::ConversionFailed(ref msg) => msg.clone(),
            AppError::UploadFailed(ref msg) => msg.clone(),
            AppError::Internal(ref msg) => msg.clone(),
            AppError::InternalWithSource { ref message, .. } => message.clone(),
        }
    }
}
