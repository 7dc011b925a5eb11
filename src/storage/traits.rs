//! Storage traits and error types
//!
//! This module defines the trait interface for the tabular catalog store and
//! associated error types.

use crate::storage::{CatalogRow, ImportRecord, MissingCounts};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for catalog store implementations
pub trait CatalogStore {
    // ===== Writes =====

    /// Replaces the whole catalog with `rows` in one transaction
    ///
    /// Returns the number of rows written. Rows sharing a dedup key after the
    /// first are ignored.
    fn replace_all(&mut self, rows: &[CatalogRow]) -> StorageResult<usize>;

    /// Logs a normalization run and returns its ID
    fn record_import(
        &mut self,
        source_path: &str,
        rows_read: usize,
        rows_written: usize,
    ) -> StorageResult<i64>;

    // ===== Reads =====

    /// All rows in catalog order
    fn load_all(&self) -> StorageResult<Vec<CatalogRow>>;

    fn count(&self) -> StorageResult<usize>;

    /// Most common categories, empty ones reported as `UNKNOWN`
    fn category_counts(&self, limit: usize) -> StorageResult<Vec<(String, usize)>>;

    /// Rows with empty description, test type and duration
    fn missing_counts(&self) -> StorageResult<MissingCounts>;

    fn latest_import(&self) -> StorageResult<Option<ImportRecord>>;
}
