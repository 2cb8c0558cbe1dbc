//! Per-request job identity and the paths derived from it.

use docpress_storage::converted_pdf_key;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Extension used when the URL looks like a legacy Word document.
pub const LEGACY_EXTENSION: &str = ".doc";
/// Extension used for everything else.
pub const DEFAULT_EXTENSION: &str = ".docx";

/// Guess the local file extension from the source URL.
///
/// This is a plain substring test: any URL containing `.doc` (including `.docx` URLs and
/// query strings) gets `.doc`, everything else gets `.docx`. The office suite sniffs the real
/// format itself, so the guess only affects the temporary file name.
pub fn source_extension_for(input_url: &str) -> &'static str {
    if input_url.contains(LEGACY_EXTENSION) {
        LEGACY_EXTENSION
    } else {
        DEFAULT_EXTENSION
    }
}

/// One conversion attempt.
///
/// The job id is generated once, in [`ConversionJob::new`], and is the only thing the
/// temporary paths and the storage key are derived from.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    job_id: Uuid,
    input_url: String,
    source_extension: &'static str,
    input_path: PathBuf,
    output_path: PathBuf,
    storage_key: String,
}

impl ConversionJob {
    pub fn new(input_url: impl Into<String>, temp_dir: &Path) -> Self {
        Self::with_id(Uuid::new_v4(), input_url, temp_dir)
    }

    pub fn with_id(job_id: Uuid, input_url: impl Into<String>, temp_dir: &Path) -> Self {
        let input_url = input_url.into();
        let source_extension = source_extension_for(&input_url);
        let stem = format!("{}_input", job_id);

        ConversionJob {
            job_id,
            source_extension,
            input_path: temp_dir.join(format!("{}{}", stem, source_extension)),
            // The converter keeps the input's base name and swaps the extension.
            output_path: temp_dir.join(format!("{}.pdf", stem)),
            storage_key: converted_pdf_key(job_id),
            input_url,
        }
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn input_url(&self) -> &str {
        &self.input_url
    }

    pub fn source_extension(&self) -> &'static str {
        self.source_extension
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Directory the converter writes into.
    pub fn output_dir(&self) -> &Path {
        self.output_path.parent().unwrap_or_else(|| Path::new("."))
    }
}
