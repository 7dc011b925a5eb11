//! Product page parser
//!
//! Extracts a `CatalogRecord` from sanitized markup. Each field is filled by
//! an ordered list of extraction strategies; the first strategy that yields a
//! non-empty value wins. Parsing never fails: a missing signal leaves the
//! field empty.

use crate::url::CanonicalUrl;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// The unit of crawl output
///
/// Serialized one per line in the raw record store. The legacy keys
/// `assessment_name` and `test_type` are accepted when reading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    #[serde(alias = "assessment_name", default)]
    pub name: String,

    /// Canonical URL; unique across the store
    pub url: String,

    #[serde(default)]
    pub category: String,

    #[serde(alias = "test_type", default)]
    pub test_type_hint: String,

    #[serde(default)]
    pub short_description: String,

    #[serde(default)]
    pub full_text: String,
}

impl CatalogRecord {
    /// Returns true if the record describes a pre-packaged bundle rather than an item
    pub fn is_prepackaged(&self) -> bool {
        is_prepackaged(&format!(
            "{} {} {}",
            self.name, self.category, self.short_description
        ))
    }
}

/// Case-insensitive check for the pre-packaged marker spellings
pub fn is_prepackaged(text: &str) -> bool {
    let lower = text.to_lowercase();
    ["pre-packaged", "pre packaged", "prepackaged"]
        .iter()
        .any(|marker| lower.contains(marker))
}

type Strategy = fn(&Html) -> Option<String>;

const NAME_STRATEGIES: &[Strategy] = &[heading_text, title_text];
const DESCRIPTION_STRATEGIES: &[Strategy] = &[meta_description, longest_description_block];

static DESCRIPTION_HINT: OnceLock<Regex> = OnceLock::new();
static BREADCRUMB: OnceLock<Regex> = OnceLock::new();
static TEST_TYPE_LABEL: OnceLock<Regex> = OnceLock::new();

/// Parses a product page into a record
///
/// # Example
///
/// ```
/// use catalog_harvest::crawler::parse_page;
/// use catalog_harvest::url::canonicalize_str;
///
/// let url = canonicalize_str("https://example.com/solutions/foo").unwrap();
/// let record = parse_page("<h1>Title</h1><p>Body text.</p>", &url, 20_000);
///
/// assert_eq!(record.name, "Title");
/// assert_eq!(record.full_text, "Body text.");
/// assert!(record.short_description.is_empty());
/// ```
pub fn parse_page(html: &str, url: &CanonicalUrl, max_full_text_chars: usize) -> CatalogRecord {
    let document = Html::parse_document(html);

    let name = first_match(&document, NAME_STRATEGIES);
    let short_description = first_match(&document, DESCRIPTION_STRATEGIES);

    let mut full_text = visible_text(&document);
    if full_text.is_empty() {
        full_text = short_description.clone();
    }

    CatalogRecord {
        name,
        url: url.as_str().to_string(),
        category: breadcrumb_trail(&document).unwrap_or_default(),
        test_type_hint: test_type_hint(&document).unwrap_or_default(),
        short_description,
        full_text: truncate_chars(&full_text, max_full_text_chars),
    }
}

/// Runs strategies in order and returns the first non-empty result
fn first_match(document: &Html, strategies: &[Strategy]) -> String {
    strategies
        .iter()
        .find_map(|strategy| strategy(document).filter(|s| !s.is_empty()))
        .unwrap_or_default()
}

fn heading_text(document: &Html) -> Option<String> {
    first_element_text(document, "h1")
}

fn title_text(document: &Html) -> Option<String> {
    first_element_text(document, "title")
}

fn meta_description(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"meta[name="description"]"#).ok()?;
    document
        .select(&selector)
        .find_map(|meta| meta.value().attr("content"))
        .map(collapse_whitespace)
}

/// Longest text among `div`/`section` elements whose class or id looks descriptive
fn longest_description_block(document: &Html) -> Option<String> {
    let selector = Selector::parse("div, section").ok()?;
    let hint = DESCRIPTION_HINT.get_or_init(|| {
        Regex::new(r"(?i)product|description|intro|summary").expect("description pattern is valid")
    });

    let mut best: Option<String> = None;
    for element in document.select(&selector) {
        let attrs = element.value();
        let matches = attrs.attr("class").map(|c| hint.is_match(c)).unwrap_or(false)
            || attrs.attr("id").map(|i| hint.is_match(i)).unwrap_or(false);
        if !matches {
            continue;
        }

        let text = element_text(element);
        if best.as_ref().map(|b| text.len() > b.len()).unwrap_or(true) {
            best = Some(text);
        }
    }
    best
}

/// Space-joined text of every `p`, `li` and `div` with non-empty direct text
fn visible_text(document: &Html) -> String {
    let Ok(selector) = Selector::parse("p, li, div") else {
        return String::new();
    };

    document
        .select(&selector)
        .filter(has_direct_text)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn has_direct_text(element: &ElementRef) -> bool {
    element
        .children()
        .filter_map(|child| child.value().as_text())
        .any(|text| !text.trim().is_empty())
}

/// Anchor texts of the breadcrumb `nav`, joined with " > "
fn breadcrumb_trail(document: &Html) -> Option<String> {
    let nav_selector = Selector::parse("nav[aria-label]").ok()?;
    let anchor_selector = Selector::parse("a").ok()?;
    let label = BREADCRUMB
        .get_or_init(|| Regex::new(r"(?i)breadcrumb").expect("breadcrumb pattern is valid"));

    let nav = document.select(&nav_selector).find(|nav| {
        nav.value()
            .attr("aria-label")
            .map(|l| label.is_match(l))
            .unwrap_or(false)
    })?;

    let parts: Vec<String> = nav
        .select(&anchor_selector)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" > "))
    }
}

/// Text of the element enclosing the first "Test Type"-like label
fn test_type_hint(document: &Html) -> Option<String> {
    let pattern = TEST_TYPE_LABEL.get_or_init(|| {
        Regex::new(r"(?i)test type|testtype|type:").expect("test type pattern is valid")
    });

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        if !pattern.is_match(text) {
            continue;
        }

        let Some(parent) = node.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        if matches!(parent.value().name(), "script" | "style") {
            continue;
        }

        let candidate = element_text(parent);
        if candidate.chars().count() > 3 {
            return Some(candidate);
        }
    }
    None
}

fn first_element_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next().map(element_text)
}

fn element_text(element: ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}
