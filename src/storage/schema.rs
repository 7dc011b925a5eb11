//! Database schema definitions
//!
//! This module contains the SQL schema for the tabular catalog store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Normalized, deduplicated catalog rows in first-seen order
CREATE TABLE IF NOT EXISTS catalog (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    dedup_key TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL DEFAULT '',
    url TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL DEFAULT '',
    test_type TEXT NOT NULL DEFAULT '',
    short_description TEXT NOT NULL DEFAULT '',
    full_text TEXT NOT NULL DEFAULT '',
    adaptive_support TEXT NOT NULL DEFAULT '',
    remote_support TEXT NOT NULL DEFAULT '',
    duration_minutes TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_catalog_category ON catalog(category);
CREATE INDEX IF NOT EXISTS idx_catalog_url ON catalog(url);

-- One row per normalization run
CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    imported_at TEXT NOT NULL,
    source_path TEXT NOT NULL,
    rows_read INTEGER NOT NULL,
    rows_written INTEGER NOT NULL
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
