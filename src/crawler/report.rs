use std::fmt;
use std::time::Duration;

/// Why a crawl ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The listing queue ran dry
    FrontierExhausted,
    /// The configured cap on newly accepted records was hit
    RecordCapReached,
    /// Cancellation was requested (Ctrl-C)
    Interrupted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::FrontierExhausted => "frontier exhausted",
            Self::RecordCapReached => "record cap reached",
            Self::Interrupted => "interrupted",
        };
        f.write_str(text)
    }
}

/// Running counters kept while the crawl is in progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlCounts {
    /// Records appended to the store during this run
    pub new_records: usize,
    /// Product pages parsed but filtered out
    pub rejected: usize,
    /// Listing and product fetches that failed
    pub failed: usize,
    /// Listing pages whose links were processed
    pub listing_pages: usize,
}

/// End-of-run summary
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub counts: CrawlCounts,
    /// Valid records in the store after the run, including earlier runs
    pub total_records: usize,
    pub elapsed: Duration,
    pub stop_reason: StopReason,
    pub expected_minimum: Option<usize>,
}

impl CrawlReport {
    /// Returns true if the store holds implausibly few records
    pub fn below_expected(&self) -> bool {
        self.expected_minimum
            .map(|minimum| self.total_records < minimum)
            .unwrap_or(false)
    }
}
