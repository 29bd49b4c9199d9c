// src/output.rs
// =============================================================================
// The crawl's persisted output: one JSON object per line.
//
//   {"url":"...","title":"...","domain":"...","text":"..."}
//
// Each record is serialized completely in memory, written as a single line and
// flushed right away. If the process dies mid-run, every line already in the
// file is a complete, parseable record.
// =============================================================================

use crate::extract::MAX_TITLE_CHARS;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// One successfully extracted page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    pub domain: String,
    pub text: String,
}

impl PageRecord {
    /// A record is valid when it carries text and a title of at most
    /// MAX_TITLE_CHARS characters.
    pub fn is_valid(&self) -> bool {
        !self.text.is_empty() && self.title.chars().count() <= MAX_TITLE_CHARS
    }
}

/// Append-only JSON-lines writer.
#[derive(Debug)]
pub struct RecordWriter<W: Write> {
    inner: W,
    path: PathBuf,
    written: usize,
}

impl RecordWriter<File> {
    /// Truncates (or creates) the file at `path`, creating parent directories.
    pub fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self::new(file, path))
    }
}

impl<W: Write> RecordWriter<W> {
    /// Wraps any writer; `path` is only used to label errors.
    pub fn new(inner: W, path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            path: path.into(),
            written: 0,
        }
    }

    /// Writes one record as a single flushed line.
    pub fn append(&mut self, record: &PageRecord) -> io::Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        self.inner.write_all(line.as_bytes())?;
        self.inner.flush()?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Reads records back one line at a time.
///
/// Blank lines are skipped; each other line yields either a record or the
/// parse error for that line, so one bad line does not hide the rest.
pub fn read_records<R: BufRead>(reader: R) -> impl Iterator<Item = io::Result<PageRecord>> {
    reader
        .lines()
        .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
        .map(|line| {
            let line = line?;
            serde_json::from_str(&line).map_err(io::Error::from)
        })
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why RecordWriter<W: Write> and not just File?
//    - Any writer works: a File in the CLI, a Vec<u8> in tests
//    - RecordWriter<File> gets an extra constructor, create()
//
// 2. What does flush() do here?
//    - Pushes the bytes out of our process to the OS right away
//    - Without it, a crash could lose records that were "written"
// -----------------------------------------------------------------------------
