use super::SinkResult;
use crate::crawler::CatalogRecord;
use crate::url::{canonicalize_str, CanonicalUrl};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Append-only line-delimited JSON record store
///
/// Each record is written as one line with a single `write_all` on a file
/// opened in append mode, so a line is either fully present or absent.
#[derive(Debug)]
pub struct JsonlStore {
    path: PathBuf,
    writer: Option<File>,
}

impl JsonlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a record as one JSON line
    pub fn append(&mut self, record: &CatalogRecord) -> SinkResult<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let file = match self.writer.take() {
            Some(file) => file,
            None => {
                let mut file = self.open_writer()?;
                // A torn last line from an interrupted run would swallow the
                // next record; terminate it first.
                if !ends_with_newline(&mut file)? {
                    debug!("Terminating partial last line in {}", self.path.display());
                    line.insert(0, '\n');
                }
                file
            }
        };
        let file = self.writer.insert(file);

        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    fn open_writer(&self) -> SinkResult<File> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?)
    }

    /// Reads every parseable record; malformed lines are skipped
    pub fn read_all(&self) -> SinkResult<Vec<CatalogRecord>> {
        read_records(&self.path)
    }

    /// Canonical URLs of every record in the store
    pub fn known_urls(&self) -> SinkResult<Vec<CanonicalUrl>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter_map(|record| match canonicalize_str(&record.url) {
                Ok(url) => Some(url),
                Err(e) => {
                    debug!("Ignoring stored record with bad URL {:?}: {}", record.url, e);
                    None
                }
            })
            .collect())
    }
}

/// Whether the file is empty or its last byte is a newline
fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Reads a JSONL file into records, skipping blank and malformed lines
///
/// A missing file reads as empty.
pub fn read_records(path: &Path) -> SinkResult<Vec<CatalogRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for (index, chunk) in reader.split(b'\n').enumerate() {
        let bytes = chunk?;
        let Ok(line) = std::str::from_utf8(&bytes) else {
            debug!("Skipping non-UTF-8 line {} in {}", index + 1, path.display());
            continue;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<CatalogRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => debug!("Skipping malformed line {} in {}: {}", index + 1, path.display(), e),
        }
    }

    Ok(records)
}
