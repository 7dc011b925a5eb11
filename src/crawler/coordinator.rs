//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Preloading the seen set from the record store
//! - Walking listing pages breadth-first
//! - Fetching, sanitizing, parsing and filtering product pages
//! - Handling interrupts and the record cap
//! - Producing the end-of-run report

use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::links::{extract_links, follows_catalog_pattern, DiscoveredLink, LinkKind};
use crate::crawler::parser::parse_page;
use crate::crawler::report::{CrawlCounts, CrawlReport, StopReason};
use crate::crawler::sanitize::sanitize;
use crate::crawler::scheduler::Scheduler;
use crate::sink::{FileSink, ResultSink};
use crate::url::{canonicalize, CanonicalUrl, OriginPolicy};
use crate::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};
use url::Url;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    fetcher: Fetcher,
    scheduler: Scheduler,
    sink: Box<dyn ResultSink + Send>,
    policy: OriginPolicy,
    counts: CrawlCounts,
}

impl Coordinator {
    /// Creates a coordinator with the configured fetch strategy and file sink
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = Fetcher::from_config(&config)?;
        let sink = FileSink::new(&config.output.records_path, &config.output.archive_dir);
        Self::with_parts(config, fetcher, Box::new(sink))
    }

    /// Creates a coordinator from explicit parts
    pub fn with_parts(
        config: Config,
        fetcher: Fetcher,
        sink: Box<dyn ResultSink + Send>,
    ) -> Result<Self> {
        let seed = Url::parse(&config.crawler.seed_url)?;
        let policy = OriginPolicy::from_seed(&seed, &config.crawler.allowed_domains)?;
        let scheduler = Scheduler::new(
            canonicalize(&seed)?,
            Duration::from_millis(config.crawler.politeness_delay_ms),
        );

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            scheduler,
            sink,
            policy,
            counts: CrawlCounts::default(),
        })
    }

    /// Frontier bookkeeping, for inspection after a run
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Runs the crawl until the frontier is exhausted, the cap is hit, or
    /// `shutdown` flips to true
    ///
    /// Only a failed append to the record store aborts the crawl.
    pub async fn run(&mut self, shutdown: watch::Receiver<bool>) -> Result<CrawlReport> {
        let start_time = Instant::now();
        info!("Starting crawl from {}", self.config.crawler.seed_url);
        debug!("Origin boundary hosts: {}", self.policy.patterns().join(", "));

        let known = self.sink.known_urls()?;
        let preloaded = self.scheduler.preload_seen(known);
        if preloaded > 0 {
            info!("Loaded {} already recorded URLs from the record store", preloaded);
        }

        let outcome = self.crawl_loop(&shutdown).await;
        self.fetcher.shutdown().await;
        let stop_reason = outcome?;

        let report = CrawlReport {
            counts: self.counts,
            total_records: self.sink.record_count()?,
            elapsed: start_time.elapsed(),
            stop_reason,
            expected_minimum: self.config.crawler.expected_minimum_records,
        };

        info!(
            "Crawl finished ({}): {} new records, {} rejected, {} failed, {} listing pages in {:?}",
            report.stop_reason,
            report.counts.new_records,
            report.counts.rejected,
            report.counts.failed,
            report.counts.listing_pages,
            report.elapsed
        );
        info!("Total records in store: {}", report.total_records);
        if let Ok(seed) = Url::parse(&self.config.crawler.seed_url) {
            debug!(
                "{} requests made to {}",
                self.scheduler.requests_to(&seed),
                seed.origin().ascii_serialization()
            );
        }

        if report.below_expected() {
            warn!(
                "Record store holds {} records, fewer than the expected minimum of {}; coverage is likely incomplete",
                report.total_records,
                report.expected_minimum.unwrap_or_default()
            );
        }

        Ok(report)
    }

    async fn crawl_loop(&mut self, shutdown: &watch::Receiver<bool>) -> Result<StopReason> {
        loop {
            if *shutdown.borrow() {
                info!("Interrupt received, stopping before next listing page");
                return Ok(StopReason::Interrupted);
            }

            let Some(listing) = self.scheduler.next_listing() else {
                info!("Frontier is empty, crawl complete");
                return Ok(StopReason::FrontierExhausted);
            };

            if let Some(reason) = self.process_listing(&listing, shutdown).await? {
                return Ok(reason);
            }

            if self.counts.listing_pages % 10 == 0 && self.counts.listing_pages > 0 {
                let frontier = self.scheduler.frontier();
                info!(
                    "Progress: {} listing pages, {} new records, {} URLs seen, {} in queue",
                    self.counts.listing_pages,
                    self.counts.new_records,
                    frontier.seen_len(),
                    frontier.queue_len()
                );
            }
        }
    }

    /// Processes a single listing page
    ///
    /// This method:
    /// 1. Fetches the page (failures are logged and the URL marked failed)
    /// 2. Extracts links and drops anything outside the origin boundary
    /// 3. Queues listing links and handles product links in document order
    /// 4. Runs the secondary discovery pass over every in-bounds link
    async fn process_listing(
        &mut self,
        listing: &CanonicalUrl,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<Option<StopReason>> {
        let url = listing.to_url()?;
        debug!("Processing listing page {}", listing);

        self.scheduler.wait_for_turn(&url).await;
        let page = match self.fetcher.fetch(&url).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Failed to fetch listing page {}: {}", listing, e);
                self.scheduler.mark_failed(listing);
                self.counts.failed += 1;
                return Ok(None);
            }
        };

        self.scheduler.mark_processed(listing);
        self.counts.listing_pages += 1;

        let links: Vec<DiscoveredLink> = extract_links(&page.body, &page.final_url)
            .into_iter()
            .filter(|link| {
                let permitted = self.policy.permits(&link.url);
                if !permitted {
                    trace!("Dropping cross-origin link {}", link.url);
                }
                permitted
            })
            .collect();

        for link in &links {
            match link.kind {
                LinkKind::Listing => {
                    self.scheduler.offer_listing(&link.canonical);
                }
                LinkKind::Product => {
                    if *shutdown.borrow() {
                        info!("Interrupt received, stopping before next product page");
                        return Ok(Some(StopReason::Interrupted));
                    }
                    if !self.scheduler.claim_product(&link.canonical) {
                        trace!("Product {} already handled", link.canonical);
                        continue;
                    }
                    if let Some(reason) = self.process_product(&link.canonical).await? {
                        return Ok(Some(reason));
                    }
                }
                LinkKind::Document | LinkKind::Other => {}
            }
        }

        for link in links.iter().filter(|link| follows_catalog_pattern(&link.url)) {
            self.scheduler.offer_discovered(&link.canonical);
        }

        Ok(None)
    }

    /// Fetches, sanitizes, parses and filters one product page
    async fn process_product(&mut self, product: &CanonicalUrl) -> Result<Option<StopReason>> {
        let url = product.to_url()?;

        self.scheduler.wait_for_turn(&url).await;
        let page = match self.fetcher.fetch(&url).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Failed to fetch product page {}: {}", product, e);
                self.scheduler.mark_failed(product);
                self.counts.failed += 1;
                return Ok(None);
            }
        };
        self.scheduler.mark_fetched(product);

        let clean = sanitize(&page.body);
        let record = parse_page(&clean, product, self.config.crawler.max_full_text_chars);

        if record.is_prepackaged() {
            info!("Skipping pre-packaged solution: {}", record.name);
            self.scheduler.mark_rejected(product);
            self.counts.rejected += 1;
            return Ok(None);
        }

        self.sink.archive(&clean, &record);
        self.sink.accept(&record)?;
        self.scheduler.mark_accepted(product);
        self.counts.new_records += 1;
        info!("Saved product: {}", record.name);

        if let Some(cap) = self.config.crawler.max_new_records {
            if self.counts.new_records >= cap {
                info!("Reached max-new-records={}, stopping", cap);
                return Ok(Some(StopReason::RecordCapReached));
            }
        }

        Ok(None)
    }
}

/// Runs a complete crawl with the configured fetcher and file sink
///
/// # Example
///
/// ```no_run
/// use catalog_harvest::config::load_config;
/// use catalog_harvest::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let (_tx, rx) = tokio::sync::watch::channel(false);
/// let report = run_crawl(config, rx).await?;
/// println!("{} new records", report.counts.new_records);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, shutdown: watch::Receiver<bool>) -> Result<CrawlReport> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run(shutdown).await
}
