//! Result sink for accepted records
//!
//! This module persists crawl output:
//! - `jsonl`: the append-only line-delimited JSON record store
//! - `archive`: best-effort HTML snapshots, one file per accepted product
//!
//! A failed append is fatal to the crawl since the record store is its only
//! durable output. A failed snapshot is logged and forgotten.

mod archive;
mod jsonl;

pub use archive::{slug, HtmlArchive};
pub use jsonl::JsonlStore;

use crate::crawler::CatalogRecord;
use crate::url::CanonicalUrl;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting records
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Record store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Trait for record sink implementations
pub trait ResultSink {
    /// Appends one record to the durable store as a single atomic write
    fn accept(&mut self, record: &CatalogRecord) -> SinkResult<()>;

    /// Saves an HTML snapshot of the record's page
    ///
    /// Failures are logged and swallowed.
    fn archive(&self, raw_html: &str, record: &CatalogRecord);

    /// Canonical URLs of every valid record already in the store
    fn known_urls(&self) -> SinkResult<Vec<CanonicalUrl>>;

    /// Number of valid records in the store
    fn record_count(&self) -> SinkResult<usize>;
}

/// File-backed sink: a JSONL record store plus an HTML archive directory
#[derive(Debug)]
pub struct FileSink {
    store: JsonlStore,
    archive: HtmlArchive,
}

impl FileSink {
    pub fn new(records_path: impl Into<PathBuf>, archive_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: JsonlStore::new(records_path),
            archive: HtmlArchive::new(archive_dir),
        }
    }
}

impl ResultSink for FileSink {
    fn accept(&mut self, record: &CatalogRecord) -> SinkResult<()> {
        self.store.append(record)
    }

    fn archive(&self, raw_html: &str, record: &CatalogRecord) {
        self.archive.save(raw_html, record);
    }

    fn known_urls(&self) -> SinkResult<Vec<CanonicalUrl>> {
        self.store.known_urls()
    }

    fn record_count(&self) -> SinkResult<usize> {
        Ok(self.store.read_all()?.len())
    }
}
