/// URL lifecycle definitions for tracking crawl progress
///
/// A URL moves `Unseen -> Queued (listing) | Candidate (product) -> Fetched ->
/// {Accepted | Rejected | Failed}`. Listing pages stop at `Fetched`.
use std::fmt;

/// Represents the current state of a URL in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlState {
    /// Not yet encountered in this run
    Unseen,

    // ===== Active States =====
    /// Listing page waiting in the frontier for link discovery
    Queued,

    /// Product page selected for fetch, parse and filter
    Candidate,

    /// Page body retrieved; listing pages stay here once their links are processed
    Fetched,

    // ===== Terminal States =====
    /// Record persisted to the sink
    Accepted,

    /// Record parsed but filtered out; never retried
    Rejected,

    /// Fetch failed; not retried within this run
    Failed,
}

impl UrlState {
    /// Returns true if no further processing will happen for this URL
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected | Self::Failed)
    }

    /// Returns true if the URL is waiting on or undergoing work
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::Candidate | Self::Fetched)
    }

    /// Checks whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: UrlState) -> bool {
        use UrlState::*;

        matches!(
            (self, next),
            (Unseen, Queued)
                | (Unseen, Candidate)
                | (Queued, Fetched)
                | (Queued, Failed)
                | (Candidate, Fetched)
                | (Candidate, Failed)
                | (Fetched, Accepted)
                | (Fetched, Rejected)
                // Accepted product pages may be revisited as listing pages
                | (Accepted, Queued)
                | (Rejected, Queued)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unseen => "unseen",
            Self::Queued => "queued",
            Self::Candidate => "candidate",
            Self::Fetched => "fetched",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
