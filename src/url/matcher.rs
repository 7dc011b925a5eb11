/// Checks if a host matches an allow-list pattern
///
/// Patterns are either an exact host (`www.example.com`) or a wildcard
/// (`*.example.com`) that matches the bare domain and any subdomain of it.
///
/// # Examples
///
/// ```
/// use catalog_harvest::url::matches_wildcard;
///
/// assert!(matches_wildcard("www.example.com", "www.example.com"));
/// assert!(!matches_wildcard("www.example.com", "example.com"));
///
/// assert!(matches_wildcard("*.example.com", "example.com"));
/// assert!(matches_wildcard("*.example.com", "cdn.assets.example.com"));
/// assert!(!matches_wildcard("*.example.com", "notexample.com"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            candidate == base
                || candidate
                    .strip_suffix(base)
                    .map(|prefix| prefix.ends_with('.'))
                    .unwrap_or(false)
        }
        None => candidate == pattern,
    }
}
