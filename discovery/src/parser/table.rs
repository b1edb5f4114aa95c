//! Whitespace-aligned table parsing.
//!
//! A table is one or more header lines, a separator made of dashes, then
//! one data row per line until the next blank line. Column positions come
//! from the header; the width of the row-name column comes from the rows.

use androidstat_core::{MetricMap, Section};
use tracing::debug;

use super::PATTERNS;
use super::columns::{ColumnBoundaries, name_end};
use super::cursor::{LineCursor, is_blank};
use super::sanitize::parse_cell;

/// Parses the table at the cursor into metrics keyed by the section prefix
/// followed by `<row name> <column name>`.
///
/// Returns `None` when the table is malformed: a blank line or the end of
/// input before the separator, a header without words, a name column that
/// is empty or reaches into the first column, a row with a word cut by a
/// column boundary, or any row whose field count does not match the header. A malformed table never yields partial
/// metrics. `Some` with an empty map is a well-formed table whose cells
/// were all absent or non-numeric.
///
/// The cursor is left on the first line after the rows (normally the
/// terminating blank line), or wherever parsing stopped on failure.
pub fn parse_table(cursor: &mut LineCursor<'_>, section: Section) -> Option<MetricMap> {
    cursor.skip_blank_lines();
    let start = cursor.position();

    let Some(header) = read_header(cursor) else {
        debug!(line = start, "table header not terminated by a separator");
        return None;
    };
    let boundaries = ColumnBoundaries::detect(&header);
    let Some(first_boundary) = boundaries.first() else {
        debug!(line = start, "table header has no columns");
        return None;
    };
    let columns = boundaries.header_names(&header);

    let name_width = cursor
        .remaining()
        .iter()
        .take_while(|line| !is_blank(line))
        .map(|line| name_end(line, first_boundary))
        .max()
        .unwrap_or(0);
    if name_width == 0 || name_width >= first_boundary {
        debug!(
            line = start,
            name_width, first_boundary, "table name column does not fit before the first column"
        );
        return None;
    }

    let mut metrics = MetricMap::new();
    while let Some(line) = cursor.peek() {
        if is_blank(line) {
            break;
        }
        if boundaries.cuts_word(line, name_width) {
            debug!(
                line = cursor.position(),
                "discarding table with a row that straddles a column boundary"
            );
            return None;
        }
        let fields = boundaries.split_row(line, name_width);
        if fields.len() != columns.len() + 1 {
            debug!(
                line = cursor.position(),
                expected = columns.len() + 1,
                found = fields.len(),
                "discarding table with misaligned row"
            );
            return None;
        }
        let (name, cells) = fields.split_first()?;
        for (column, cell) in columns.iter().zip(cells) {
            if let Some(value) = parse_cell(cell) {
                metrics.insert(section.metric_key(&format!("{name} {column}")), value);
            }
        }
        cursor.advance();
    }

    Some(metrics)
}

/// Collects header lines up to and including the separator.
fn read_header<'a>(cursor: &mut LineCursor<'a>) -> Option<Vec<&'a str>> {
    let mut header = Vec::new();
    loop {
        let line = cursor.peek()?;
        if is_blank(line) {
            return None;
        }
        cursor.advance();
        if PATTERNS.header_separator.is_match(line) {
            return Some(header);
        }
        header.push(line);
    }
}
