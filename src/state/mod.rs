//! State module for tracking crawl progress
//!
//! This module provides the crawl-lifetime state: per-URL lifecycle states,
//! per-origin politeness accounting, and the frontier itself.
//!
//! # Components
//!
//! - `UrlState`: Lifecycle of a single URL (unseen, queued, candidate, fetched, accepted, etc.)
//! - `OriginState`: Tracks per-origin request timing for the politeness delay
//! - `FrontierState`: The seen/queued/processed sets and the FIFO of listing pages

mod frontier;
mod origin_state;
mod url_state;

// Re-export main types
pub use frontier::FrontierState;
pub use origin_state::OriginState;
pub use url_state::UrlState;
