//! Catalog normalization
//!
//! Turns the raw line-delimited record store into the tabular catalog store:
//! - Field fallbacks across raw record generations
//! - Deduplication by URL, or by name and category when the URL is missing
//! - One import log entry per run

mod normalize;

pub use normalize::{normalize_value, normalize_values, read_raw_values};

use crate::storage::CatalogStore;
use std::path::Path;

/// Outcome of one normalization run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOutcome {
    /// Non-blank lines in the raw store
    pub rows_read: usize,
    /// Unique rows written to the catalog
    pub rows_written: usize,
    pub import_id: i64,
}

/// Normalizes the raw store at `raw_path` into `store`
///
/// Prior catalog contents are replaced.
pub fn normalize_file(raw_path: &Path, store: &mut dyn CatalogStore) -> crate::Result<NormalizeOutcome> {
    tracing::info!("Normalizing raw records from {}", raw_path.display());

    let (values, rows_read) = read_raw_values(raw_path)?;
    let rows = normalize_values(&values);
    tracing::debug!(
        "{} lines read, {} parsed, {} unique rows",
        rows_read,
        values.len(),
        rows.len()
    );

    let rows_written = store.replace_all(&rows)?;
    let import_id = store.record_import(&raw_path.display().to_string(), rows_read, rows_written)?;

    tracing::info!("Wrote {} catalog rows (import #{})", rows_written, import_id);

    Ok(NormalizeOutcome {
        rows_read,
        rows_written,
        import_id,
    })
}
