//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the CatalogStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{CatalogStore, StorageResult};
use crate::storage::{CatalogRow, ImportRecord, MissingCounts};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::fs;
use std::path::Path;

const ROW_COLUMNS: &str = "name, url, category, test_type, short_description, full_text, \
                           adaptive_support, remote_support, duration_minutes";

/// SQLite catalog backend
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Opens or creates the database at `path`, creating parent directories
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn row_to_catalog(row: &Row) -> rusqlite::Result<CatalogRow> {
    Ok(CatalogRow {
        name: row.get(0)?,
        url: row.get(1)?,
        category: row.get(2)?,
        test_type: row.get(3)?,
        short_description: row.get(4)?,
        full_text: row.get(5)?,
        adaptive_support: row.get(6)?,
        remote_support: row.get(7)?,
        duration_minutes: row.get(8)?,
    })
}

impl CatalogStore for SqliteCatalog {
    // ===== Writes =====

    fn replace_all(&mut self, rows: &[CatalogRow]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM catalog", [])?;

        let mut written = 0;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT OR IGNORE INTO catalog (dedup_key, {}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                ROW_COLUMNS
            ))?;

            for row in rows {
                written += stmt.execute(params![
                    row.dedup_key(),
                    row.name,
                    row.url,
                    row.category,
                    row.test_type,
                    row.short_description,
                    row.full_text,
                    row.adaptive_support,
                    row.remote_support,
                    row.duration_minutes,
                ])?;
            }
        }

        tx.commit()?;
        Ok(written)
    }

    fn record_import(
        &mut self,
        source_path: &str,
        rows_read: usize,
        rows_written: usize,
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO imports (imported_at, source_path, rows_read, rows_written) \
             VALUES (?1, ?2, ?3, ?4)",
            params![now, source_path, rows_read as i64, rows_written as i64],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // ===== Reads =====

    fn load_all(&self) -> StorageResult<Vec<CatalogRow>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM catalog ORDER BY id", ROW_COLUMNS))?;

        let rows = stmt
            .query_map([], row_to_catalog)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    fn count(&self) -> StorageResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM catalog", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn category_counts(&self, limit: usize) -> StorageResult<Vec<(String, usize)>> {
        let mut stmt = self.conn.prepare(
            "SELECT CASE WHEN TRIM(category) = '' THEN 'UNKNOWN' ELSE category END AS cat,
                    COUNT(*) AS n
             FROM catalog
             GROUP BY cat
             ORDER BY n DESC, cat ASC
             LIMIT ?1",
        )?;

        let counts = stmt
            .query_map(params![limit as i64], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    fn missing_counts(&self) -> StorageResult<MissingCounts> {
        let counts = self.conn.query_row(
            "SELECT
                COALESCE(SUM(TRIM(short_description) = ''), 0),
                COALESCE(SUM(TRIM(test_type) = ''), 0),
                COALESCE(SUM(TRIM(duration_minutes) = ''), 0)
             FROM catalog",
            [],
            |row| {
                Ok(MissingCounts {
                    short_description: row.get::<_, i64>(0)? as usize,
                    test_type: row.get::<_, i64>(1)? as usize,
                    duration_minutes: row.get::<_, i64>(2)? as usize,
                })
            },
        )?;
        Ok(counts)
    }

    fn latest_import(&self) -> StorageResult<Option<ImportRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, imported_at, source_path, rows_read, rows_written \
                 FROM imports ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok(ImportRecord {
                        id: row.get(0)?,
                        imported_at: row.get(1)?,
                        source_path: row.get(2)?,
                        rows_read: row.get::<_, i64>(3)? as usize,
                        rows_written: row.get::<_, i64>(4)? as usize,
                    })
                },
            )
            .optional()?;

        Ok(record)
    }
}
