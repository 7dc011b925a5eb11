use crate::{UrlError, UrlResult};
use std::fmt;
use url::Url;

/// A URL reduced to its deduplication key
///
/// Two URLs that differ only by a fragment or by trailing slashes share the
/// same `CanonicalUrl`. The scheme and host are compared after the lowercase
/// normalization performed by the `url` parser, so `HTTPS://X.com/a` and
/// `https://x.com/a/` are equal while `http://x.com/a` is not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    /// Returns the canonical form as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the canonical form back into a `Url` for fetching
    pub fn to_url(&self) -> UrlResult<Url> {
        Url::parse(&self.0).map_err(|e| UrlError::Parse(e.to_string()))
    }

    /// Returns true if the path names a PDF document rather than a page
    pub fn is_document(&self) -> bool {
        self.0
            .split(['?', '#'])
            .next()
            .map(|path| path.to_ascii_lowercase().ends_with(".pdf"))
            .unwrap_or(false)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonicalizes a parsed URL
///
/// # Canonicalization Steps
///
/// 1. Reject schemes other than http and https
/// 2. Remove the fragment
/// 3. Remove trailing slashes from the path
/// 4. With no query, drop the lone `/` of a root path as well
///
/// # Examples
///
/// ```
/// use catalog_harvest::url::canonicalize;
/// use url::Url;
///
/// let a = canonicalize(&Url::parse("https://x.com/a/").unwrap()).unwrap();
/// let b = canonicalize(&Url::parse("https://x.com/a#frag").unwrap()).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "https://x.com/a");
/// ```
pub fn canonicalize(url: &Url) -> UrlResult<CanonicalUrl> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    let mut url = url.clone();
    url.set_fragment(None);

    let trimmed = url.path().trim_end_matches('/').to_string();
    url.set_path(&trimmed);

    let mut canonical = url.to_string();
    if url.query().is_none() {
        while canonical.ends_with('/') {
            canonical.pop();
        }
    }

    Ok(CanonicalUrl(canonical))
}

/// Parses and canonicalizes a URL string
///
/// # Examples
///
/// ```
/// use catalog_harvest::url::canonicalize_str;
///
/// let url = canonicalize_str("https://Example.com/solutions/foo/#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/solutions/foo");
/// ```
pub fn canonicalize_str(url_str: &str) -> UrlResult<CanonicalUrl> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize(&url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_and_trailing_slash_dedupe() {
        let a = canonicalize_str("https://x.com/a/").unwrap();
        let b = canonicalize_str("https://x.com/a#frag").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "https://x.com/a");
    }

    #[test]
    fn test_root_slash_removed() {
        let url = canonicalize_str("https://x.com/").unwrap();
        assert_eq!(url.as_str(), "https://x.com");
        assert_eq!(canonicalize_str("https://x.com").unwrap(), url);
    }

    #[test]
    fn test_multiple_trailing_slashes() {
        let url = canonicalize_str("https://x.com/catalog///").unwrap();
        assert_eq!(url.as_str(), "https://x.com/catalog");
    }

    #[test]
    fn test_query_preserved() {
        let url = canonicalize_str("https://x.com/catalog/?start=12&type=1#list").unwrap();
        assert_eq!(url.as_str(), "https://x.com/catalog?start=12&type=1");
    }

    #[test]
    fn test_host_lowercased() {
        let url = canonicalize_str("HTTPS://X.COM/Solutions/Foo/").unwrap();
        assert_eq!(url.as_str(), "https://x.com/Solutions/Foo");
    }

    #[test]
    fn test_scheme_is_significant() {
        let secure = canonicalize_str("https://x.com/a").unwrap();
        let plain = canonicalize_str("http://x.com/a").unwrap();
        assert_ne!(secure, plain);
    }

    #[test]
    fn test_invalid_scheme() {
        let result = canonicalize_str("mailto:a@b.com");
        assert!(matches!(result, Err(UrlError::InvalidScheme(_))));
    }

    #[test]
    fn test_malformed_url() {
        assert!(matches!(canonicalize_str("not a url"), Err(UrlError::Parse(_))));
    }

    #[test]
    fn test_round_trips_to_url() {
        let canonical = canonicalize_str("https://x.com/a/b/").unwrap();
        let url = canonical.to_url().unwrap();
        assert_eq!(url.path(), "/a/b");
    }

    #[test]
    fn test_pdf_detection() {
        assert!(canonicalize_str("https://x.com/files/Brochure.PDF").unwrap().is_document());
        assert!(!canonicalize_str("https://x.com/pdf-tools").unwrap().is_document());
        assert!(!canonicalize_str("https://x.com/view?file=a.html").unwrap().is_document());
    }
}
