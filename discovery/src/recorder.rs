//! CSV recording of successive captures.
//!
//! The column set is fixed by the first recorded snapshot: its keys,
//! optionally narrowed by a filter, sorted ascending. Later snapshots fill
//! the same columns; a metric missing from one leaves its cell empty.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use androidstat_core::MetricMap;
use chrono::NaiveDateTime;
use regex::Regex;
use tracing::debug;

use crate::error::Result;

/// Field separator.
pub const SEPARATOR: char = ';';

/// Timestamp layout of the first column.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Appends one row per snapshot to a `;`-separated file.
pub struct CsvRecorder<W: Write> {
    writer: W,
    filter: Option<Regex>,
    columns: Option<Vec<String>>,
    bytes_written: usize,
}

impl CsvRecorder<BufWriter<File>> {
    /// Creates (or truncates) `path` for recording.
    pub fn create(path: impl AsRef<Path>, filter: Option<Regex>) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file), filter))
    }
}

impl<W: Write> CsvRecorder<W> {
    pub fn new(writer: W, filter: Option<Regex>) -> Self {
        Self {
            writer,
            filter,
            columns: None,
            bytes_written: 0,
        }
    }

    /// Writes a row for `metrics`, preceded by the header on the first call.
    ///
    /// Returns the number of bytes written by this call.
    pub fn record(&mut self, time: NaiveDateTime, metrics: &MetricMap) -> Result<usize> {
        let mut out = String::new();

        if self.columns.is_none() {
            let mut columns: Vec<String> = metrics
                .keys()
                .filter(|key| self.filter.as_ref().is_none_or(|re| re.is_match(key)))
                .cloned()
                .collect();
            columns.sort();
            debug!(columns = columns.len(), "Fixed CSV columns");

            out.push_str("Time");
            for column in &columns {
                out.push(SEPARATOR);
                out.push_str(column);
            }
            out.push('\n');
            self.columns = Some(columns);
        }
        let columns = self.columns.as_deref().unwrap_or_default();

        out.push_str(&time.format(TIME_FORMAT).to_string());
        for column in columns {
            out.push(SEPARATOR);
            if let Some(value) = metrics.get(column) {
                out.push_str(&value.to_string());
            }
        }
        out.push('\n');

        self.writer.write_all(out.as_bytes())?;
        self.writer.flush()?;
        self.bytes_written += out.len();
        Ok(out.len())
    }

    /// Columns fixed by the first snapshot, if one was recorded.
    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
