//! Output module for catalog summaries and crawl reports
//!
//! This module handles:
//! - Building a summary of the tabular catalog store
//! - Writing that summary as markdown
//! - Printing catalog statistics and end-of-crawl reports

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, write_markdown_summary};
pub use stats::{print_crawl_report, print_summary};

use crate::storage::{CatalogStore, ImportRecord, MissingCounts, StorageResult};

/// Number of categories listed in summaries
pub const TOP_CATEGORY_LIMIT: usize = 10;

/// Snapshot of the tabular catalog store
#[derive(Debug, Clone, Default)]
pub struct CatalogSummary {
    /// Unique rows in the catalog
    pub total_rows: usize,

    /// Most common categories, most frequent first (empty shown as UNKNOWN)
    pub top_categories: Vec<(String, usize)>,

    /// Rows lacking description, test type or duration
    pub missing: MissingCounts,

    /// Most recent normalization run, if any
    pub latest_import: Option<ImportRecord>,
}

impl CatalogSummary {
    /// Percentage of rows with a non-empty value, given a missing count
    pub fn coverage(&self, missing: usize) -> f64 {
        if self.total_rows == 0 {
            return 0.0;
        }
        let present = self.total_rows.saturating_sub(missing);
        present as f64 / self.total_rows as f64 * 100.0
    }
}

/// Generates a catalog summary from the store
pub fn summarize(store: &dyn CatalogStore) -> StorageResult<CatalogSummary> {
    Ok(CatalogSummary {
        total_rows: store.count()?,
        top_categories: store.category_counts(TOP_CATEGORY_LIMIT)?,
        missing: store.missing_counts()?,
        latest_import: store.latest_import()?,
    })
}
