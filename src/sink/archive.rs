use crate::crawler::CatalogRecord;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

const MAX_SLUG_CHARS: usize = 200;

/// Directory of HTML snapshots, one per accepted product
#[derive(Debug, Clone)]
pub struct HtmlArchive {
    dir: PathBuf,
}

impl HtmlArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path a record's snapshot is stored under
    pub fn path_for(&self, record: &CatalogRecord) -> PathBuf {
        let source = if record.name.is_empty() {
            &record.url
        } else {
            &record.name
        };
        self.dir.join(format!("{}.html", slug(source)))
    }

    /// Writes the snapshot unless a file with the same name exists
    pub fn save(&self, raw_html: &str, record: &CatalogRecord) {
        let path = self.path_for(record);
        if path.exists() {
            debug!("Snapshot {} already exists, skipping", path.display());
            return;
        }

        let result = fs::create_dir_all(&self.dir).and_then(|_| fs::write(&path, raw_html));
        if let Err(e) = result {
            warn!("Failed to archive {} to {}: {}", record.url, path.display(), e);
        }
    }
}

/// Filesystem-safe slug
///
/// Characters other than alphanumerics, `_`, `-`, `.` and space become `_`;
/// runs of spaces collapse to one `_`; the result is cut to 200 characters.
///
/// # Examples
///
/// ```
/// use catalog_harvest::sink::slug;
///
/// assert_eq!(slug("Java 8 (New)"), "Java_8__New_");
/// assert_eq!(slug("https://x.com/a"), "https___x.com_a");
/// ```
pub fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;

    for c in text.chars() {
        if c == ' ' {
            if !in_space {
                out.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;

        if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
            out.push(c);
        } else {
            out.push('_');
        }
    }

    out.chars().take(MAX_SLUG_CHARS).collect()
}
