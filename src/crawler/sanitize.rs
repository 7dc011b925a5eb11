//! Markup sanitizer
//!
//! Strips executable and styling content from raw markup before anything is
//! parsed or persisted. Visible text is left untouched.

use lol_html::{element, rewrite_str, RewriteStrSettings};
use tracing::warn;

/// Elements removed together with their content
const STRIPPED_ELEMENTS: &str = "script, style, iframe, noscript, link";

/// Removes scripts, styles, frames, inline event handlers and `javascript:` links
///
/// # Examples
///
/// ```
/// use catalog_harvest::crawler::sanitize;
///
/// let clean = sanitize(r#"<p onclick="x()">Hi<script>alert(1)</script></p>"#);
/// assert_eq!(clean, "<p>Hi</p>");
/// ```
pub fn sanitize(html: &str) -> String {
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!(STRIPPED_ELEMENTS, |el| {
                    el.remove();
                    Ok(())
                }),
                element!("*", |el| {
                    let handlers: Vec<String> = el
                        .attributes()
                        .iter()
                        .map(|attr| attr.name())
                        .filter(|name| name.to_ascii_lowercase().starts_with("on"))
                        .collect();
                    for name in handlers {
                        el.remove_attribute(&name);
                    }

                    let scripted_href = el
                        .get_attribute("href")
                        .map(|href| is_javascript_href(&href))
                        .unwrap_or(false);
                    if scripted_href {
                        el.remove_attribute("href");
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    );

    match result {
        Ok(clean) => clean,
        Err(e) => {
            warn!("Failed to sanitize markup: {}", e);
            String::new()
        }
    }
}

fn is_javascript_href(href: &str) -> bool {
    href.trim_start()
        .get(..11)
        .map(|scheme| scheme.eq_ignore_ascii_case("javascript:"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_script_element() {
        let clean = sanitize("<div>Keep<script>alert(1)</script></div>");
        assert!(!clean.contains("<script"));
        assert!(!clean.contains("alert(1)"));
        assert!(clean.contains("Keep"));
    }

    #[test]
    fn test_removes_all_stripped_elements() {
        let html = r#"<html><head><link rel="stylesheet" href="a.css"><style>p{color:red}</style></head>
            <body><iframe src="x"></iframe><noscript>Enable JS</noscript><p>Body</p></body></html>"#;
        let clean = sanitize(html);

        assert!(!clean.contains("<link"));
        assert!(!clean.contains("<style"));
        assert!(!clean.contains("color:red"));
        assert!(!clean.contains("<iframe"));
        assert!(!clean.contains("Enable JS"));
        assert!(clean.contains("<p>Body</p>"));
    }

    #[test]
    fn test_strips_event_handlers_case_insensitively() {
        let clean = sanitize(r#"<a href="/x" onClick="x()" ONMOUSEOVER="y()" class="c">Go</a>"#);
        assert!(!clean.to_lowercase().contains("onclick"));
        assert!(!clean.to_lowercase().contains("onmouseover"));
        assert!(clean.contains(r#"href="/x""#));
        assert!(clean.contains(r#"class="c""#));
    }

    #[test]
    fn test_strips_javascript_href() {
        let clean = sanitize(r#"<a href=" JavaScript:void(0)">Click</a><a href="/ok">Ok</a>"#);
        assert!(!clean.to_lowercase().contains("javascript:"));
        assert!(clean.contains(r#"href="/ok""#));
        assert!(clean.contains("Click"));
    }

    #[test]
    fn test_visible_text_untouched() {
        let html = "<h1>Title &amp; More</h1><p>Some <b>bold</b> text.</p>";
        assert_eq!(sanitize(html), html);
    }

    #[test]
    fn test_javascript_href_detection() {
        assert!(is_javascript_href("javascript:alert(1)"));
        assert!(is_javascript_href("  JAVASCRIPT:x"));
        assert!(!is_javascript_href("/javascript-guide"));
        assert!(!is_javascript_href("java"));
    }
}
