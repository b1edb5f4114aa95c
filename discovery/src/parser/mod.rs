//! `dumpsys meminfo` output parser.
//!
//! The output of `adb shell dumpsys meminfo <pid>` is plain text aligned
//! for humans. This module turns it into a flat [`MetricMap`]:
//!
//! - The `** MEMINFO in pid <pid> [<name>] **` marker introduces the
//!   mandatory overview table, keyed with the `MEM ` prefix.
//! - `App Summary` introduces another table (`APP `).
//! - `Objects` and `SQL` introduce runs of `name: value` pairs (`OBJECTS `,
//!   `SQL `).
//! - Everything else is skipped.
//!
//! # Architecture
//!
//! [`MeminfoParser`] owns a forward-only [`LineCursor`] and hands it to the
//! section parsers in turn: [`parse_table`] for column-aligned tables and
//! [`scan_key_values`] for key/value blocks. Both share [`parse_cell`] for
//! turning a cell into an integer.
//!
//! Only a missing marker or an unusable overview table fails a scan. A
//! malformed optional table contributes nothing, a cut-short key/value block
//! keeps what it collected, and unparseable cells are dropped silently.
//!
//! Most consumers should use
//! [`parse_meminfo_text`](crate::parse_meminfo_text) instead.

mod columns;
mod cursor;
mod keyvalue;
mod sanitize;
mod table;

use std::sync::LazyLock;

use androidstat_core::{MetricMap, ScanError, Section, SectionLayout};
use regex::Regex;
use tracing::debug;

pub use columns::{ColumnBoundaries, name_end, word_ends};
pub use cursor::{LineCursor, is_blank};
pub use keyvalue::scan_key_values;
pub use sanitize::{parse_cell, strip_brackets};
pub use table::parse_table;

/// Regex patterns for `dumpsys meminfo` output.
static PATTERNS: LazyLock<MeminfoPatterns> = LazyLock::new(MeminfoPatterns::new);

struct MeminfoPatterns {
    overview_intro: Regex,
    header_separator: Regex,
    key_value_pair: Regex,
    bracket: Regex,
}

impl MeminfoPatterns {
    fn new() -> Self {
        // All regexes here are compile-time constants. An expect() failure indicates
        // a programmer error in the pattern, not a runtime condition.
        Self {
            // ** MEMINFO in pid 4242 [com.example.app] **
            overview_intro: Regex::new(
                r"^[\t ]*[*]{2}[\t ]+MEMINFO[\t ]in[\t ]pid[\t ][0-9]+[\t ]+\[[^\]]+\][\t ]+[*]{2}[\t ]*$",
            )
            .expect("static regex must compile"),
            // ------   ------
            header_separator: Regex::new(r"^[\t -]+$").expect("static regex must compile"),
            // Views:       11         ViewRootImpl:        1
            key_value_pair: Regex::new(r"([a-zA-Z_ ]+):[\t ]*([0-9]+)")
                .expect("static regex must compile"),
            // 123 (stale)
            bracket: Regex::new(r"\([^()]*\)").expect("static regex must compile"),
        }
    }
}

/// Returns `true` if `line` is the marker that precedes the overview table.
pub fn is_overview_intro(line: &str) -> bool {
    PATTERNS.overview_intro.is_match(line)
}

/// Sections handled during one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanDiagnostics {
    /// Sections that contributed to the result, in input order.
    pub parsed_sections: Vec<Section>,
    /// Sections whose table was malformed and contributed nothing.
    pub discarded_sections: Vec<Section>,
}

/// Parser for one `dumpsys meminfo` capture.
pub struct MeminfoParser<'a> {
    cursor: LineCursor<'a>,
    diagnostics: ScanDiagnostics,
}

impl<'a> MeminfoParser<'a> {
    /// Creates a parser over already split, newline-free lines.
    pub fn new(lines: &'a [&'a str]) -> Self {
        Self {
            cursor: LineCursor::new(lines),
            diagnostics: ScanDiagnostics::default(),
        }
    }

    /// Parses the capture into metrics.
    ///
    /// # Errors
    ///
    /// [`ScanError::OverviewNotFound`] if no marker line exists, and
    /// [`ScanError::NoMemoryInfo`] if the overview table after it is
    /// malformed or holds no values.
    pub fn parse(&mut self) -> Result<MetricMap, ScanError> {
        if !self.seek_overview_intro() {
            return Err(ScanError::OverviewNotFound);
        }

        let mut metrics = match parse_table(&mut self.cursor, Section::Overview) {
            Some(overview) if !overview.is_empty() => overview,
            _ => {
                self.diagnostics.discarded_sections.push(Section::Overview);
                return Err(ScanError::NoMemoryInfo);
            }
        };
        self.diagnostics.parsed_sections.push(Section::Overview);

        while let Some(line) = self.cursor.peek() {
            self.cursor.advance();
            let Some(section) = Section::from_label(line) else {
                continue;
            };
            debug!(%section, line = self.cursor.position() - 1, "Parsing section");
            match self.parse_section(section) {
                Some(found) => {
                    self.diagnostics.parsed_sections.push(section);
                    metrics.extend(found);
                }
                None => self.diagnostics.discarded_sections.push(section),
            }
        }

        Ok(metrics)
    }

    pub fn diagnostics(&self) -> &ScanDiagnostics {
        &self.diagnostics
    }

    /// Moves the cursor just past the marker line.
    fn seek_overview_intro(&mut self) -> bool {
        while let Some(line) = self.cursor.peek() {
            self.cursor.advance();
            if is_overview_intro(line) {
                return true;
            }
        }
        false
    }

    fn parse_section(&mut self, section: Section) -> Option<MetricMap> {
        match section.layout() {
            SectionLayout::Table => parse_table(&mut self.cursor, section),
            SectionLayout::KeyValue => Some(scan_key_values(&mut self.cursor, section)),
        }
    }
}

/// Splits raw command output into lines, dropping carriage returns.
pub fn split_lines(output: &str) -> Vec<&str> {
    output
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}
