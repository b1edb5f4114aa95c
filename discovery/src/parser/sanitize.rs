//! Cell sanitizing: bracket stripping and integer parsing.

use std::borrow::Cow;

use super::PATTERNS;

/// Removes every parenthesized annotation that contains no nested `(`.
///
/// ```
/// use androidstat_discovery::parser::strip_brackets;
///
/// assert_eq!(strip_brackets("123 (stale)"), "123 ");
/// assert_eq!(strip_brackets("no brackets"), "no brackets");
/// ```
pub fn strip_brackets(raw: &str) -> Cow<'_, str> {
    PATTERNS.bracket.replace_all(raw, "")
}

/// Parses one table cell or key/value number.
///
/// Bracketed annotations are dropped and the rest trimmed. An empty
/// remainder means the cell is absent; anything that is not a plain
/// non-negative integer is dropped. Neither case is an error.
pub fn parse_cell(raw: &str) -> Option<i64> {
    let stripped = strip_brackets(raw);
    let value = stripped.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
