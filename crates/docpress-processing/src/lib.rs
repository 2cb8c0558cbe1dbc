//! Docpress Processing Library
//!
//! The conversion pipeline: download a Word-family document, run the headless office suite on
//! it, verify the PDF it produced, upload it and hand back a signed download URL.
//!
//! Collaborators are injected as trait objects so that each stage can be replaced in tests:
//!
//! - [`DocumentFetcher`] streams the source document to disk ([`HttpFetcher`])
//! - [`DocumentConverter`] runs the external converter ([`SofficeConverter`])
//! - [`docpress_storage::Storage`] stores the PDF and presigns the download link
//!
//! All per-job files live in one shared temporary directory and are namespaced by the job id,
//! see [`ConversionJob`].

pub mod cleanup;
pub mod converter;
pub mod error;
pub mod fetcher;
pub mod job;
pub mod pipeline;

pub use cleanup::{remove_if_exists, DeferredCleanup};
pub use converter::{ConversionOutput, DocumentConverter, SofficeConverter};
pub use error::ConversionError;
pub use fetcher::{DocumentFetcher, HttpFetcher};
pub use job::{source_extension_for, ConversionJob};
pub use pipeline::{ConversionPipeline, ConvertedDocument};
