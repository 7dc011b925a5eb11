//! URL handling module for Catalog-Harvest
//!
//! This module provides URL canonicalization, domain extraction, host
//! pattern matching, and the same-origin boundary for a crawl.

mod domain;
mod matcher;
mod normalize;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, origin_key};
pub use matcher::matches_wildcard;
pub use normalize::{canonicalize, canonicalize_str, CanonicalUrl};

/// The same-origin boundary of a crawl
///
/// Derived from the seed URL: a candidate is in bounds when its host matches
/// the seed host (or one of the extra allow-list patterns) and its effective
/// port equals the seed's. Everything else is dropped unconditionally.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    patterns: Vec<String>,
    port: Option<u16>,
}

impl OriginPolicy {
    /// Builds the policy from the seed URL and extra host patterns
    ///
    /// # Examples
    ///
    /// ```
    /// use catalog_harvest::url::OriginPolicy;
    /// use url::Url;
    ///
    /// let seed = Url::parse("https://www.example.com/catalog/").unwrap();
    /// let policy = OriginPolicy::from_seed(&seed, &[]).unwrap();
    ///
    /// assert!(policy.permits(&Url::parse("https://www.example.com/solutions/x").unwrap()));
    /// assert!(!policy.permits(&Url::parse("https://other.example/x").unwrap()));
    /// ```
    pub fn from_seed(seed: &Url, extra_patterns: &[String]) -> UrlResult<Self> {
        let host = extract_domain(seed).ok_or(UrlError::MissingDomain)?;

        let mut patterns = vec![host];
        patterns.extend(extra_patterns.iter().map(|p| p.to_lowercase()));

        Ok(Self {
            patterns,
            port: seed.port_or_known_default(),
        })
    }

    /// Returns true if the URL lies inside the crawl boundary
    pub fn permits(&self, url: &Url) -> bool {
        if url.scheme() != "http" && url.scheme() != "https" {
            return false;
        }

        if url.port_or_known_default() != self.port {
            return false;
        }

        match extract_domain(url) {
            Some(domain) => self
                .patterns
                .iter()
                .any(|pattern| matches_wildcard(pattern, &domain)),
            None => false,
        }
    }

    /// Host patterns in effect, seed host first
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}
