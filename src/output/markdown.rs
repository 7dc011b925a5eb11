//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of the tabular
//! catalog: row totals, the most common categories and missing-field counts.

use crate::output::CatalogSummary;
use chrono::Utc;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary to `output_path`, creating parent directories
pub fn write_markdown_summary(summary: &CatalogSummary, output_path: &Path) -> std::io::Result<()> {
    let markdown = format_markdown_summary(summary);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a catalog summary as markdown
pub fn format_markdown_summary(summary: &CatalogSummary) -> String {
    let mut md = String::new();

    md.push_str("# Catalog Summary\n\n");
    md.push_str(&format!("- **Generated**: {}\n", Utc::now().to_rfc3339()));
    if let Some(import) = &summary.latest_import {
        md.push_str(&format!("- **Import**: #{} at {}\n", import.id, import.imported_at));
        md.push_str(&format!("- **Source**: {}\n", import.source_path));
        md.push_str(&format!("- **Raw Lines Read**: {}\n", import.rows_read));
    }
    md.push_str(&format!("- **Total Unique Rows**: {}\n\n", summary.total_rows));

    md.push_str("## Top Categories\n\n");
    if summary.top_categories.is_empty() {
        md.push_str("No categories recorded.\n\n");
    } else {
        md.push_str("| Category | Rows |\n");
        md.push_str("|----------|------|\n");
        for (category, count) in &summary.top_categories {
            md.push_str(&format!("| {} | {} |\n", category.replace('|', "\\|"), count));
        }
        md.push('\n');
    }

    md.push_str("## Missing Fields\n\n");
    md.push_str("| Field | Missing | Coverage |\n");
    md.push_str("|-------|---------|----------|\n");
    for (field, missing) in [
        ("short_description", summary.missing.short_description),
        ("test_type", summary.missing.test_type),
        ("duration_minutes", summary.missing.duration_minutes),
    ] {
        md.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            field,
            missing,
            summary.coverage(missing)
        ));
    }

    md
}
