//! Storage module for the tabular catalog store
//!
//! This module handles all database operations for normalized catalog data:
//! - SQLite database initialization and schema management
//! - Bulk replacement of catalog rows
//! - Import run logging
//! - Aggregate queries used by summaries and statistics

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteCatalog;
pub use traits::{CatalogStore, StorageError, StorageResult};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Opens or creates the catalog database
pub fn open_catalog(path: &Path) -> StorageResult<SqliteCatalog> {
    SqliteCatalog::new(path)
}

/// A normalized catalog row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub name: String,
    pub url: String,
    pub category: String,
    pub test_type: String,
    pub short_description: String,
    pub full_text: String,
    pub adaptive_support: String,
    pub remote_support: String,
    pub duration_minutes: String,
}

impl CatalogRow {
    /// Deduplication key: the URL when present, else `name|category`
    pub fn dedup_key(&self) -> String {
        if self.url.is_empty() {
            format!("{}|{}", self.name, self.category)
        } else {
            self.url.clone()
        }
    }
}

/// A logged normalization run
#[derive(Debug, Clone)]
pub struct ImportRecord {
    pub id: i64,
    pub imported_at: String,
    pub source_path: String,
    pub rows_read: usize,
    pub rows_written: usize,
}

/// Counts of rows lacking commonly missing fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MissingCounts {
    pub short_description: usize,
    pub test_type: usize,
    pub duration_minutes: usize,
}
