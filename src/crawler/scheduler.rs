//! Scheduler for managing the crawl frontier and politeness
//!
//! This module handles:
//! - The FIFO queue of listing pages
//! - Deduplication decisions for listing and product candidates
//! - Per-URL lifecycle bookkeeping
//! - Per-origin minimum delays between requests

use crate::state::{FrontierState, OriginState, UrlState};
use crate::url::{origin_key, CanonicalUrl};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, trace};
use url::Url;

/// Scheduler exclusively owns the frontier for one crawl
///
/// Every mutation of the seen/queued/processed sets goes through here, so a
/// URL can never be enqueued or accepted twice.
pub struct Scheduler {
    frontier: FrontierState,

    /// Per-origin request timing
    origin_states: HashMap<String, OriginState>,

    /// Minimum time between requests to the same origin
    politeness: Duration,
}

impl Scheduler {
    /// Creates a scheduler with the seed listing page queued
    pub fn new(seed: CanonicalUrl, politeness: Duration) -> Self {
        let mut frontier = FrontierState::new();
        frontier.enqueue(seed);

        Self {
            frontier,
            origin_states: HashMap::new(),
            politeness,
        }
    }

    /// Marks URLs already present in the durable store as seen
    ///
    /// Returns the number of distinct URLs added.
    pub fn preload_seen<I>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = CanonicalUrl>,
    {
        self.frontier.preload_seen(urls)
    }

    /// Pops the next listing page, skipping anything already processed
    pub fn next_listing(&mut self) -> Option<CanonicalUrl> {
        while let Some(url) = self.frontier.pop() {
            if self.frontier.is_processed(&url) {
                trace!("Skipping already processed listing {}", url);
                continue;
            }
            return Some(url);
        }
        None
    }

    /// Offers a listing link found by the primary classification pass
    ///
    /// Queued only if it is not seen, queued, processed or failed.
    pub fn offer_listing(&mut self, url: &CanonicalUrl) -> bool {
        if self.frontier.is_seen(url) {
            return false;
        }
        self.offer_discovered(url)
    }

    /// Offers a link found by the secondary discovery pass
    ///
    /// Does not consult `seen`: an accepted product page may still be walked
    /// once as a listing page to reach deeper pagination.
    pub fn offer_discovered(&mut self, url: &CanonicalUrl) -> bool {
        if url.is_document()
            || self.frontier.is_queued(url)
            || self.frontier.is_processed(url)
            || self.frontier.is_failed(url)
        {
            return false;
        }

        let queued = self.frontier.enqueue(url.clone());
        if queued {
            debug!("Queued listing page {}", url);
        }
        queued
    }

    /// Decides whether a product link still needs fetch, parse and filter
    ///
    /// If so, the URL moves to `Candidate`.
    pub fn claim_product(&mut self, url: &CanonicalUrl) -> bool {
        if url.is_document()
            || self.frontier.is_seen(url)
            || self.frontier.is_failed(url)
            || self.frontier.is_processed(url)
        {
            return false;
        }
        self.frontier.set_state(url, UrlState::Candidate);
        true
    }

    /// Records that a page body was retrieved
    pub fn mark_fetched(&mut self, url: &CanonicalUrl) {
        self.frontier.set_state(url, UrlState::Fetched);
    }

    /// Records that a listing page's links have been taken
    pub fn mark_processed(&mut self, url: &CanonicalUrl) {
        self.frontier.mark_processed(url);
    }

    pub fn mark_accepted(&mut self, url: &CanonicalUrl) {
        self.frontier.mark_seen(url, UrlState::Accepted);
    }

    /// Rejected URLs join `seen` so they are never retried
    pub fn mark_rejected(&mut self, url: &CanonicalUrl) {
        self.frontier.mark_seen(url, UrlState::Rejected);
    }

    pub fn mark_failed(&mut self, url: &CanonicalUrl) {
        self.frontier.mark_failed(url);
    }

    /// Waits until the URL's origin may receive another request, then books it
    pub async fn wait_for_turn(&mut self, url: &Url) {
        let key = origin_key(url).unwrap_or_default();
        let politeness = self.politeness;

        let wait = self
            .origin_states
            .get(&key)
            .and_then(|state| state.time_until_next_request(politeness, Instant::now()));

        if let Some(wait) = wait {
            trace!("Politeness wait of {:?} for {}", wait, key);
            tokio::time::sleep(wait).await;
        }

        self.origin_states
            .entry(key)
            .or_default()
            .record_request(Instant::now());
    }

    /// Lifecycle state of a URL
    pub fn state_of(&self, url: &CanonicalUrl) -> UrlState {
        self.frontier.state_of(url)
    }

    pub fn frontier(&self) -> &FrontierState {
        &self.frontier
    }

    /// Returns the number of requests made to an origin so far
    pub fn requests_to(&self, url: &Url) -> u32 {
        origin_key(url)
            .and_then(|key| self.origin_states.get(&key))
            .map(|state| state.request_count)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::canonicalize_str;

    fn c(s: &str) -> CanonicalUrl {
        canonicalize_str(s).unwrap()
    }

    fn scheduler() -> Scheduler {
        Scheduler::new(c("https://x.com/catalog/"), Duration::ZERO)
    }

    #[test]
    fn test_seed_is_queued() {
        let mut scheduler = scheduler();
        assert_eq!(scheduler.frontier().queue_len(), 1);
        assert_eq!(scheduler.next_listing(), Some(c("https://x.com/catalog")));
        assert_eq!(scheduler.next_listing(), None);
    }

    #[test]
    fn test_offer_listing_dedup() {
        let mut scheduler = scheduler();
        let page = c("https://x.com/catalog/page/2");

        assert!(scheduler.offer_listing(&page));
        assert!(!scheduler.offer_listing(&page));

        scheduler.next_listing();
        let popped = scheduler.next_listing().unwrap();
        scheduler.mark_processed(&popped);
        assert!(!scheduler.offer_listing(&page));
    }

    #[test]
    fn test_offer_listing_skips_seen() {
        let mut scheduler = scheduler();
        let accepted = c("https://x.com/solutions/a");
        scheduler.preload_seen(vec![accepted.clone()]);

        assert!(!scheduler.offer_listing(&accepted));
        assert!(scheduler.offer_discovered(&accepted));
    }

    #[test]
    fn test_failed_never_requeued() {
        let mut scheduler = scheduler();
        let broken = c("https://x.com/catalog/page/9");
        scheduler.mark_failed(&broken);

        assert!(!scheduler.offer_listing(&broken));
        assert!(!scheduler.offer_discovered(&broken));
        assert!(!scheduler.claim_product(&broken));
    }

    #[test]
    fn test_claim_product() {
        let mut scheduler = scheduler();
        let product = c("https://x.com/solutions/a");

        assert!(scheduler.claim_product(&product));
        assert_eq!(scheduler.state_of(&product), UrlState::Candidate);

        scheduler.mark_fetched(&product);
        scheduler.mark_accepted(&product);
        assert_eq!(scheduler.state_of(&product), UrlState::Accepted);
        assert!(!scheduler.claim_product(&product));
    }

    #[test]
    fn test_rejected_product_is_seen() {
        let mut scheduler = scheduler();
        let product = c("https://x.com/product/bundle");

        assert!(scheduler.claim_product(&product));
        scheduler.mark_fetched(&product);
        scheduler.mark_rejected(&product);

        assert!(scheduler.frontier().is_seen(&product));
        assert!(!scheduler.claim_product(&product));
    }

    #[test]
    fn test_processed_listing_not_claimed_as_product() {
        let mut scheduler = scheduler();
        let seed = scheduler.next_listing().unwrap();
        scheduler.mark_processed(&seed);

        let seed_as_product = c("https://x.com/catalog/");
        assert!(!scheduler.claim_product(&seed_as_product));
    }

    #[test]
    fn test_documents_rejected() {
        let mut scheduler = scheduler();
        let pdf = c("https://x.com/solutions/sheet.pdf");
        assert!(!scheduler.claim_product(&pdf));
        assert!(!scheduler.offer_discovered(&pdf));
    }

    #[test]
    fn test_processed_entries_skipped_on_pop() {
        let mut scheduler = scheduler();
        let page = c("https://x.com/catalog/page/2");
        scheduler.offer_listing(&page);
        scheduler.mark_processed(&page);

        assert_eq!(scheduler.next_listing(), Some(c("https://x.com/catalog")));
        assert_eq!(scheduler.next_listing(), None);
    }

    #[tokio::test]
    async fn test_wait_for_turn_books_requests() {
        let mut scheduler = scheduler();
        let url = Url::parse("https://x.com/a").unwrap();

        scheduler.wait_for_turn(&url).await;
        scheduler.wait_for_turn(&url).await;

        assert_eq!(scheduler.requests_to(&url), 2);
        assert_eq!(
            scheduler.requests_to(&Url::parse("https://y.com/").unwrap()),
            0
        );
    }

    #[tokio::test]
    async fn test_wait_for_turn_enforces_delay() {
        let mut scheduler = Scheduler::new(c("https://x.com/"), Duration::from_millis(150));
        let url = Url::parse("https://x.com/a").unwrap();

        scheduler.wait_for_turn(&url).await;
        let start = Instant::now();
        scheduler.wait_for_turn(&url).await;

        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_origins_have_independent_budgets() {
        let mut scheduler = Scheduler::new(c("https://x.com/"), Duration::from_secs(5));

        scheduler
            .wait_for_turn(&Url::parse("https://x.com/a").unwrap())
            .await;
        let start = Instant::now();
        scheduler
            .wait_for_turn(&Url::parse("https://y.com/a").unwrap())
            .await;

        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
