//! Crawler module for catalog discovery and record extraction
//!
//! This module contains the crawl-and-extract pipeline, including:
//! - Page fetching with a run-wide static or rendered strategy
//! - Markup sanitizing
//! - Link extraction and listing/product classification
//! - Product page parsing into records
//! - Frontier scheduling and politeness
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod links;
mod parser;
mod report;
mod sanitize;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator};
#[cfg(feature = "render")]
pub use fetcher::RenderedFetcher;
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher, StaticFetcher};
pub use links::{classify, extract_links, follows_catalog_pattern, DiscoveredLink, LinkKind};
pub use parser::{is_prepackaged, parse_page, CatalogRecord};
pub use report::{CrawlCounts, CrawlReport, StopReason};
pub use sanitize::sanitize;
pub use scheduler::Scheduler;
