//! Storage key generation for converted documents.
//!
//! Key format: `converted/{job_id}.pdf`.

use uuid::Uuid;

/// Prefix under which every converted PDF is stored.
pub const CONVERTED_PREFIX: &str = "converted";

/// Generate the storage key for a job's converted PDF.
pub fn converted_pdf_key(job_id: Uuid) -> String {
    format!("{}/{}.pdf", CONVERTED_PREFIX, job_id)
}

/// Reject keys that could escape a backend's namespace.
pub fn validate_key(storage_key: &str) -> bool {
    !storage_key.is_empty() && !storage_key.contains("..") && !storage_key.starts_with('/')
}
