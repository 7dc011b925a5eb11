//! Statistics display
//!
//! Prints catalog statistics and end-of-crawl reports to stdout.

use crate::crawler::CrawlReport;
use crate::output::CatalogSummary;

/// Prints catalog statistics to stdout in a formatted manner
pub fn print_summary(summary: &CatalogSummary) {
    println!("=== Catalog Statistics ===\n");

    println!("Overview:");
    println!("  Total unique rows: {}", summary.total_rows);
    if let Some(import) = &summary.latest_import {
        println!(
            "  Last import: #{} at {} ({} lines read, {} rows written)",
            import.id, import.imported_at, import.rows_read, import.rows_written
        );
    }
    println!();

    println!("Top categories (top {}):", crate::output::TOP_CATEGORY_LIMIT);
    for (category, count) in &summary.top_categories {
        println!("  {:4}  {}", count, category);
    }
    println!();

    println!("Missing fields counts:");
    for (field, missing) in [
        ("short_description", summary.missing.short_description),
        ("test_type", summary.missing.test_type),
        ("duration_minutes", summary.missing.duration_minutes),
    ] {
        println!("  {:20}: {}", field, missing);
    }
}

/// Prints the end-of-run crawl report
pub fn print_crawl_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");
    println!("  Stop reason: {}", report.stop_reason);
    println!("  Elapsed: {:.1}s", report.elapsed.as_secs_f64());
    println!("  Listing pages processed: {}", report.counts.listing_pages);
    println!("  New records: {}", report.counts.new_records);
    println!("  Rejected: {}", report.counts.rejected);
    println!("  Failed fetches: {}", report.counts.failed);
    println!("  Total records in store: {}", report.total_records);

    if report.below_expected() {
        if let Some(minimum) = report.expected_minimum {
            println!(
                "\n  Warning: only {} records stored, expected at least {}",
                report.total_records, minimum
            );
        }
    }
}
