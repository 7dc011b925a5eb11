//! Field coercions applied when catalog rows are loaded for ranking

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn separator_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[;,/|]+").expect("separator pattern is valid"))
}

fn conjunction_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\band\b").expect("conjunction pattern is valid"))
}

fn digits_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+").expect("digits pattern is valid"))
}

const NEGATIVE: &[&str] = &["n/a", "none", "no", "false", "0"];
const AFFIRMATIVE: &[&str] = &["yes", "true", "available", "supported", "y", "1", "able"];

/// Collapses free-form support text to exactly `"Yes"` or `"No"`
///
/// Unknown text is `"No"`. Affirmative markers match as substrings.
pub fn yes_no(value: &str) -> &'static str {
    let lowered = value.trim().to_lowercase();
    if lowered.is_empty() || NEGATIVE.contains(&lowered.as_str()) {
        return "No";
    }
    if AFFIRMATIVE.iter().any(|marker| lowered.contains(marker)) {
        "Yes"
    } else {
        "No"
    }
}

/// Reads a duration in minutes
///
/// Numeric text is truncated to an integer; otherwise the first run of digits
/// is used, and 0 when there is none.
pub fn parse_duration(value: &str) -> i64 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return 0;
    }

    if let Ok(number) = trimmed.parse::<f64>() {
        if number.is_finite() {
            return number.trunc() as i64;
        }
    }

    digits_pattern()
        .find(trimmed)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Splits a test type field into distinct labels, preserving order
///
/// Labels are separated by `;`, `,`, `/`, `|` or the word "and". Duplicates
/// are compared case-insensitively and the first spelling is kept.
pub fn split_test_types(value: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut labels = Vec::new();

    for part in separator_pattern().split(value) {
        for piece in conjunction_pattern().split(part) {
            let label = piece.trim();
            if label.is_empty() {
                continue;
            }
            if seen.insert(label.to_lowercase()) {
                labels.push(label.to_string());
            }
        }
    }

    labels
}
