use std::time::{Duration, Instant};

/// Tracks the state of an origin during crawling
///
/// Politeness is a per-origin rate budget: consecutive requests to the same
/// origin are spaced by at least the configured delay.
#[derive(Debug, Clone, Default)]
pub struct OriginState {
    /// Number of requests made to this origin in the current crawl
    pub request_count: u32,

    /// Timestamp of the last request to this origin
    pub last_request_time: Option<Instant>,
}

impl OriginState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if a request can be made to this origin without waiting
    pub fn can_request(&self, min_delay: Duration, now: Instant) -> bool {
        self.time_until_next_request(min_delay, now).is_none()
    }

    /// Records that a request was made to this origin
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_request_time = Some(now);
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, min_delay: Duration, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < min_delay {
            Some(min_delay - elapsed)
        } else {
            None
        }
    }
}
