use super::UrlState;
use crate::url::CanonicalUrl;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// Crawl-lifetime frontier state
///
/// Created once per crawl, seeded from the durable store, and mutated only
/// through the scheduler. Nothing here survives the process.
#[derive(Debug, Default)]
pub struct FrontierState {
    /// URLs accepted into the sink or explicitly rejected; never re-processed
    seen: HashSet<CanonicalUrl>,

    /// Listing pages already fetched for link discovery
    processed_pages: HashSet<CanonicalUrl>,

    /// FIFO of listing pages awaiting link discovery
    queue: VecDeque<CanonicalUrl>,

    /// Mirror of `queue` for membership checks
    queued: HashSet<CanonicalUrl>,

    /// URLs whose fetch failed during this run
    failed: HashSet<CanonicalUrl>,

    states: HashMap<CanonicalUrl, UrlState>,
}

impl FrontierState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks every URL already present in the durable store as seen
    pub fn preload_seen<I>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = CanonicalUrl>,
    {
        let before = self.seen.len();
        self.seen.extend(urls);
        self.seen.len() - before
    }

    /// Appends a listing page to the back of the queue
    ///
    /// Returns false if it is already queued.
    pub fn enqueue(&mut self, url: CanonicalUrl) -> bool {
        if !self.queued.insert(url.clone()) {
            return false;
        }
        self.set_state(&url, UrlState::Queued);
        self.queue.push_back(url);
        true
    }

    /// Pops the head of the queue
    pub fn pop(&mut self) -> Option<CanonicalUrl> {
        let url = self.queue.pop_front()?;
        self.queued.remove(&url);
        Some(url)
    }

    pub fn is_seen(&self, url: &CanonicalUrl) -> bool {
        self.seen.contains(url)
    }

    pub fn is_queued(&self, url: &CanonicalUrl) -> bool {
        self.queued.contains(url)
    }

    pub fn is_processed(&self, url: &CanonicalUrl) -> bool {
        self.processed_pages.contains(url)
    }

    pub fn is_failed(&self, url: &CanonicalUrl) -> bool {
        self.failed.contains(url)
    }

    /// Records that a listing page's links have been taken
    pub fn mark_processed(&mut self, url: &CanonicalUrl) {
        self.processed_pages.insert(url.clone());
        self.set_state(url, UrlState::Fetched);
    }

    /// Records a terminal outcome for a product page and adds it to `seen`
    pub fn mark_seen(&mut self, url: &CanonicalUrl, outcome: UrlState) {
        self.seen.insert(url.clone());
        self.set_state(url, outcome);
    }

    pub fn mark_failed(&mut self, url: &CanonicalUrl) {
        self.failed.insert(url.clone());
        self.set_state(url, UrlState::Failed);
    }

    /// Lifecycle state of a URL
    ///
    /// URLs preloaded from the store without a transition in this run report
    /// as `Accepted`.
    pub fn state_of(&self, url: &CanonicalUrl) -> UrlState {
        match self.states.get(url) {
            Some(state) => *state,
            None if self.seen.contains(url) => UrlState::Accepted,
            None => UrlState::Unseen,
        }
    }

    pub fn set_state(&mut self, url: &CanonicalUrl, next: UrlState) {
        let current = self.state_of(url);
        if current != next && !current.can_transition_to(next) {
            debug!("Unusual transition for {}: {} -> {}", url, current, next);
        }
        self.states.insert(url.clone(), next);
    }

    /// Number of URLs that reached `state` during this run
    pub fn count_in(&self, state: UrlState) -> usize {
        self.states.values().filter(|s| **s == state).count()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn seen_len(&self) -> usize {
        self.seen.len()
    }

    pub fn failed_len(&self) -> usize {
        self.failed.len()
    }
}
