//! `name: value` block scanning.

use androidstat_core::{MetricMap, Section};

use super::PATTERNS;
use super::cursor::{LineCursor, is_blank};
use super::sanitize::parse_cell;

/// Collects `name: number` pairs from consecutive lines.
///
/// Leading blank lines are skipped. Scanning stops at the first blank line
/// or the first line without any pair; that line is left under the cursor
/// and everything collected so far is returned. Keys are
/// the section's prefix followed by the trimmed name.
pub fn scan_key_values(cursor: &mut LineCursor<'_>, section: Section) -> MetricMap {
    cursor.skip_blank_lines();

    let mut metrics = MetricMap::new();
    while let Some(line) = cursor.peek() {
        if is_blank(line) {
            break;
        }
        let mut matched = false;
        for captures in PATTERNS.key_value_pair.captures_iter(line) {
            matched = true;
            if let Some(value) = parse_cell(&captures[2]) {
                metrics.insert(section.metric_key(captures[1].trim()), value);
            }
        }
        if !matched {
            break;
        }
        cursor.advance();
    }
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stops_at_first_non_matching_line() {
        let lines = ["Views: 10", "ViewRootImpl: 2", "garbage", ""];
        let mut cursor = LineCursor::new(&lines);
        let metrics = scan_key_values(&mut cursor, Section::Objects);

        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics["OBJECTS Views"], 10);
        assert_eq!(metrics["OBJECTS ViewRootImpl"], 2);
        assert_eq!(cursor.peek(), Some("garbage"));
    }

    #[test]
    fn test_several_pairs_per_line() {
        let lines = [
            "",
            "               Views:       11         ViewRootImpl:        1",
            "       Local Binders:       11        Proxy Binders:       32",
            "",
            "         MEMORY_USED:      341",
        ];
        let mut cursor = LineCursor::new(&lines);
        let metrics = scan_key_values(&mut cursor, Section::Objects);

        assert_eq!(metrics.len(), 4);
        assert_eq!(metrics["OBJECTS Local Binders"], 11);
        assert_eq!(metrics["OBJECTS Proxy Binders"], 32);
        assert!(!metrics.contains_key("OBJECTS MEMORY_USED"));
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn test_pairs_with_tabs_and_no_space() {
        let lines = ["MALLOC_SIZE:\t117 PAGECACHE_OVERFLOW:74"];
        let mut cursor = LineCursor::new(&lines);
        let metrics = scan_key_values(&mut cursor, Section::Sql);

        assert_eq!(metrics["SQL MALLOC_SIZE"], 117);
        assert_eq!(metrics["SQL PAGECACHE_OVERFLOW"], 74);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let lines: [&str; 2] = ["", "  "];
        let mut cursor = LineCursor::new(&lines);
        assert!(scan_key_values(&mut cursor, Section::Sql).is_empty());
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_later_duplicate_overwrites_earlier() {
        let lines = ["Assets: 5", "Assets: 7"];
        let mut cursor = LineCursor::new(&lines);
        let metrics = scan_key_values(&mut cursor, Section::Objects);
        assert_eq!(metrics["OBJECTS Assets"], 7);
    }
}
