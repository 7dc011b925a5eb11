use url::Url;

/// Extracts the lowercase host of a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use catalog_harvest::url::extract_domain;
///
/// let url = Url::parse("https://WWW.Example.com/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("www.example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Key used for per-origin politeness accounting: `host[:port]`
///
/// The port is only included when it differs from the scheme default, so
/// `https://x.com` and `https://x.com:443` share a budget.
pub fn origin_key(url: &Url) -> Option<String> {
    let host = extract_domain(url)?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_domain() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_keeps_subdomain() {
        let url = Url::parse("https://www.shop.example.com/products/x").unwrap();
        assert_eq!(extract_domain(&url), Some("www.shop.example.com".to_string()));
    }

    #[test]
    fn test_extract_ignores_port() {
        let url = Url::parse("http://127.0.0.1:8080/").unwrap();
        assert_eq!(extract_domain(&url), Some("127.0.0.1".to_string()));
    }

    #[test]
    fn test_origin_key_includes_explicit_port() {
        let url = Url::parse("http://127.0.0.1:8080/catalog").unwrap();
        assert_eq!(origin_key(&url), Some("127.0.0.1:8080".to_string()));
    }

    #[test]
    fn test_origin_key_default_port_omitted() {
        let a = Url::parse("https://example.com:443/a").unwrap();
        let b = Url::parse("https://example.com/b").unwrap();
        assert_eq!(origin_key(&a), origin_key(&b));
    }

    #[test]
    fn test_no_host() {
        let url = Url::parse("data:text/plain,hello").unwrap();
        assert_eq!(extract_domain(&url), None);
        assert_eq!(origin_key(&url), None);
    }
}
