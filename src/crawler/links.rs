//! Link extraction and classification
//!
//! Listing pages are mined for anchors. Every anchor is resolved against the
//! page URL and classified by path heuristics:
//!
//! | Pattern | Kind |
//! |---------|------|
//! | `/page/`, `/tag/`, `/category/`, `/blog/`, `page=N`, `page/N` | Listing |
//! | `/product`, `/products/`, `/solutions/` | Product |
//! | path ending in `.pdf` | Document |
//! | anything else | Other |
//!
//! Listing wins when a URL matches both listing and product patterns.

use crate::url::{canonicalize, CanonicalUrl};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::trace;
use url::Url;

static PAGING: OnceLock<Regex> = OnceLock::new();

fn paging_pattern() -> &'static Regex {
    PAGING.get_or_init(|| Regex::new(r"(?i)page=\d+|page/\d+").expect("paging pattern is valid"))
}

const LISTING_SEGMENTS: [&str; 4] = ["/page/", "/tag/", "/category/", "/blog/"];
const PRODUCT_SEGMENTS: [&str; 3] = ["/product", "/products/", "/solutions/"];
const CATALOG_SEGMENTS: [&str; 2] = ["/solutions/", "/products/"];

/// Classification of an outbound link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Queued for further link discovery
    Listing,
    /// Fetched, parsed and filtered as a catalog item
    Product,
    /// Binary document; never fetched
    Document,
    Other,
}

/// An absolute outbound link found on a page
#[derive(Debug, Clone)]
pub struct DiscoveredLink {
    pub url: Url,
    pub canonical: CanonicalUrl,
    pub kind: LinkKind,
}

/// Classifies a URL by path heuristics
pub fn classify(url: &Url, canonical: &CanonicalUrl) -> LinkKind {
    if canonical.is_document() {
        return LinkKind::Document;
    }

    let path = url.path().to_lowercase();
    if is_listing(url, &path) {
        LinkKind::Listing
    } else if PRODUCT_SEGMENTS.iter().any(|seg| path.contains(seg)) {
        LinkKind::Product
    } else {
        LinkKind::Other
    }
}

fn is_listing(url: &Url, lower_path: &str) -> bool {
    LISTING_SEGMENTS.iter().any(|seg| lower_path.contains(seg))
        || paging_pattern().is_match(url.as_str())
}

/// Returns true if a link should be queued by the secondary discovery pass
///
/// The secondary pass looks past the primary classification and follows
/// anything under `/solutions/` or `/products/` plus any paging URL, so deep
/// pagination is not lost when the primary pass misses it.
pub fn follows_catalog_pattern(url: &Url) -> bool {
    let lower = url.as_str().to_lowercase();
    CATALOG_SEGMENTS.iter().any(|seg| lower.contains(seg)) || paging_pattern().is_match(&lower)
}

/// Extracts and classifies every anchor on a page
///
/// Links are resolved against `base_url`, deduplicated by canonical form and
/// returned in document order. `mailto:`, `tel:` and `javascript:` anchors,
/// fragment-only anchors and anything that does not resolve to http(s) are
/// dropped.
///
/// # Example
///
/// ```
/// use catalog_harvest::crawler::{extract_links, LinkKind};
/// use url::Url;
///
/// let html = r#"<a href="/solutions/foo">Foo</a><a href="/blog/2020/post">Post</a><a href="mailto:a@b.com">Mail</a>"#;
/// let base = Url::parse("https://example.com/catalog/").unwrap();
/// let links = extract_links(html, &base);
///
/// assert_eq!(links.len(), 2);
/// assert_eq!(links[0].kind, LinkKind::Product);
/// assert_eq!(links[1].kind, LinkKind::Listing);
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<DiscoveredLink> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    let Ok(selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_link(href, base_url) else {
            continue;
        };
        let Ok(canonical) = canonicalize(&url) else {
            continue;
        };
        if !seen.insert(canonical.clone()) {
            continue;
        }

        let kind = classify(&url, &canonical);
        trace!("Link {} classified as {:?}", canonical, kind);
        links.push(DiscoveredLink {
            url,
            canonical,
            kind,
        });
    }

    links
}

/// Resolves a link href to an absolute http(s) URL
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/catalog/").unwrap()
    }

    fn kinds(html: &str) -> Vec<(String, LinkKind)> {
        extract_links(html, &base_url())
            .into_iter()
            .map(|l| (l.canonical.into_string(), l.kind))
            .collect()
    }

    #[test]
    fn test_product_blog_mailto_classification() {
        let html = r#"
            <a href="/solutions/foo">Foo</a>
            <a href="/blog/2020/post">Post</a>
            <a href="mailto:a@b.com">Mail</a>
        "#;
        let links = kinds(html);

        assert_eq!(links.len(), 2);
        let products: Vec<_> = links.iter().filter(|(_, k)| *k == LinkKind::Product).collect();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].0, "https://example.com/solutions/foo");
        assert_eq!(
            links[1],
            ("https://example.com/blog/2020/post".to_string(), LinkKind::Listing)
        );
    }

    #[test]
    fn test_listing_takes_precedence() {
        let html = r#"<a href="/products/page/2">Next</a><a href="/solutions/list?page=3">More</a>"#;
        for (_, kind) in kinds(html) {
            assert_eq!(kind, LinkKind::Listing);
        }
    }

    #[test]
    fn test_product_patterns_case_insensitive() {
        let html = r#"<a href="/Product/abc">A</a><a href="/PRODUCTS/xyz">B</a>"#;
        for (_, kind) in kinds(html) {
            assert_eq!(kind, LinkKind::Product);
        }
    }

    #[test]
    fn test_category_and_tag_are_listings() {
        let html = r#"<a href="/category/tests">C</a><a href="/tag/skills">T</a>"#;
        for (_, kind) in kinds(html) {
            assert_eq!(kind, LinkKind::Listing);
        }
    }

    #[test]
    fn test_pdf_is_document() {
        let html = r#"<a href="/solutions/factsheet.pdf">PDF</a>"#;
        assert_eq!(kinds(html)[0].1, LinkKind::Document);
    }

    #[test]
    fn test_other_links() {
        let html = r#"<a href="/about-us">About</a>"#;
        assert_eq!(kinds(html)[0].1, LinkKind::Other);
    }

    #[test]
    fn test_relative_resolution() {
        let html = r#"<a href="../solutions/x">X</a><a href="page/4">P</a>"#;
        let links = kinds(html);
        assert_eq!(links[0].0, "https://example.com/solutions/x");
        assert_eq!(links[1].0, "https://example.com/catalog/page/4");
    }

    #[test]
    fn test_dedupes_by_canonical_form() {
        let html = r#"<a href="/solutions/a/">A</a><a href="/solutions/a#reviews">A again</a>"#;
        assert_eq!(kinds(html).len(), 1);
    }

    #[test]
    fn test_skips_special_schemes() {
        let html = r##"
            <a href="tel:+123">Call</a>
            <a href="JavaScript:void(0)">JS</a>
            <a href="#top">Top</a>
            <a href="">Empty</a>
            <a href="ftp://example.com/file">FTP</a>
        "##;
        assert!(kinds(html).is_empty());
    }

    #[test]
    fn test_cross_domain_links_are_extracted_but_absolute() {
        let html = r#"<a href="https://other.example/x">X</a>"#;
        let links = extract_links(html, &base_url());
        assert_eq!(links[0].url.host_str(), Some("other.example"));
    }

    #[test]
    fn test_follows_catalog_pattern() {
        let url = |s: &str| Url::parse(s).unwrap();
        assert!(follows_catalog_pattern(&url("https://x.com/solutions/a")));
        assert!(follows_catalog_pattern(&url("https://x.com/products/b")));
        assert!(follows_catalog_pattern(&url("https://x.com/list?Page=7")));
        assert!(follows_catalog_pattern(&url("https://x.com/list/page/2")));
        assert!(!follows_catalog_pattern(&url("https://x.com/about")));
        assert!(!follows_catalog_pattern(&url("https://x.com/product/a")));
    }
}
