//! Android memory statistics: `dumpsys meminfo` scanning and device access.
//!
//! This crate turns the human-aligned text printed by
//! `adb shell dumpsys meminfo <pid>` into a flat map of named integer
//! metrics, and drives `adb` to capture that text from a running device.
//!
//! # Main entry points
//!
//! - [`parse_meminfo_text`] scans pre-captured output without touching a
//!   device.
//! - [`engine::MetricsEngine`] resolves a package's pid, captures its
//!   meminfo and tracks per-metric trends across captures.
//! - [`recorder::CsvRecorder`] appends captures to a `;`-separated file.
//!
//! # Example
//!
//! ```
//! use androidstat_discovery::parse_meminfo_text;
//!
//! let output = "\
//! ** MEMINFO in pid 4242 [com.example.app] **
//!                    Pss  Private
//!                  Total    Dirty
//!                 ------   ------
//!   Native Heap     1024      900
//!      TOTAL        2048     1800
//!
//!  Objects
//!                Views:       11         ViewRootImpl:        1
//! ";
//!
//! let metrics = parse_meminfo_text(output).unwrap();
//! assert_eq!(metrics["MEM Native Heap Pss Total"], 1024);
//! assert_eq!(metrics["MEM TOTAL Private Dirty"], 1800);
//! assert_eq!(metrics["OBJECTS ViewRootImpl"], 1);
//! ```

pub mod adb;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod parser;
pub mod recorder;

pub use androidstat_core::{MetricMap, ScanError};
pub use error::ReaderError;

use parser::{MeminfoParser, split_lines};

/// Scans captured `dumpsys meminfo` output into a metric map.
///
/// Line endings may be `\n` or `\r\n`.
///
/// # Errors
///
/// Returns [`ScanError::OverviewNotFound`] if the `** MEMINFO in pid ... **`
/// marker is missing and [`ScanError::NoMemoryInfo`] if the overview table
/// after it is malformed or yields no values.
pub fn parse_meminfo_text(text: &str) -> Result<MetricMap, ScanError> {
    let lines = split_lines(text);
    MeminfoParser::new(&lines).parse()
}

/// Scans output that has already been split into lines.
///
/// # Examples
///
/// ```
/// use androidstat_discovery::{ScanError, parse_meminfo_lines};
///
/// let lines = vec!["no marker here".to_string()];
/// assert_eq!(parse_meminfo_lines(&lines), Err(ScanError::OverviewNotFound));
/// ```
pub fn parse_meminfo_lines<S: AsRef<str>>(lines: &[S]) -> Result<MetricMap, ScanError> {
    let lines: Vec<&str> = lines.iter().map(AsRef::as_ref).collect();
    MeminfoParser::new(&lines).parse()
}
