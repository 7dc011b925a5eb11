use crate::storage::CatalogRow;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Returns the first field in `keys` holding a truthy value
///
/// Empty strings, empty arrays, `null`, `false` and zero count as absent so
/// that the next key in the chain is consulted.
fn first_present<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| is_truthy(value))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Renders a scalar or array value as a flat string
fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter(|item| is_truthy(item))
            .map(|item| stringify(item).trim().to_string())
            .collect::<Vec<_>>()
            .join(";"),
        other => other.to_string(),
    }
}

fn field(object: &Map<String, Value>, keys: &[&str]) -> String {
    first_present(object, keys).map(stringify).unwrap_or_default()
}

/// Maps one raw record onto the tabular row shape
///
/// Raw stores written by different crawler generations use different keys,
/// so each column consults a fallback chain. Non-object values produce an
/// empty row.
pub fn normalize_value(value: &Value) -> CatalogRow {
    let Some(object) = value.as_object() else {
        return CatalogRow::default();
    };

    let short_description = field(object, &["short_description", "description", "summary"]);
    let full_text = first_present(object, &["full_text", "description"])
        .map(stringify)
        .unwrap_or_else(|| short_description.clone());

    CatalogRow {
        name: field(object, &["assessment_name", "name", "title"]),
        url: field(object, &["url"]),
        category: field(object, &["category", "categories"]),
        test_type: field(
            object,
            &["test_type", "testTypes", "test_type_list", "test_type_hint"],
        ),
        short_description,
        full_text,
        adaptive_support: field(object, &["adaptive_support", "adaptive"]),
        remote_support: field(object, &["remote_support", "remote"]),
        duration_minutes: field(object, &["duration_minutes", "duration"]),
    }
}

/// Reads every parseable JSON line from the raw store
///
/// Returns the parsed values and the number of non-blank lines read.
pub fn read_raw_values(path: &Path) -> std::io::Result<(Vec<Value>, usize)> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);

    let mut values = Vec::new();
    let mut lines_read = 0;

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        lines_read += 1;

        match serde_json::from_str::<Value>(line) {
            Ok(value) => values.push(value),
            Err(e) => tracing::debug!("Skipping malformed line {}: {}", index + 1, e),
        }
    }

    Ok((values, lines_read))
}

/// Normalizes raw values and drops later duplicates of the same key
pub fn normalize_values(values: &[Value]) -> Vec<CatalogRow> {
    let mut seen = std::collections::HashSet::new();
    values
        .iter()
        .map(normalize_value)
        .filter(|row| seen.insert(row.dedup_key()))
        .collect()
}
