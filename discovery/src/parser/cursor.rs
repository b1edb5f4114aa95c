//! Read position shared by the section parsers of one scan.

/// Returns `true` for lines that contain only whitespace.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Forward-only position over the lines of one scan.
///
/// Every section parser takes the cursor by `&mut` and leaves it on the first
/// line it did not consume. The position never moves backwards, so a scan
/// is a single pass over its input.
#[derive(Debug, Clone)]
pub struct LineCursor<'a> {
    lines: &'a [&'a str],
    position: usize,
}

impl<'a> LineCursor<'a> {
    pub fn new(lines: &'a [&'a str]) -> Self {
        Self { lines, position: 0 }
    }

    /// Index of the current line.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.lines.len()
    }

    /// Current line, or `None` once the input is exhausted.
    pub fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.position).copied()
    }

    /// Moves past the current line.
    pub fn advance(&mut self) {
        if !self.is_at_end() {
            self.position += 1;
        }
    }

    /// Lines from the current position to the end, without consuming them.
    pub fn remaining(&self) -> &'a [&'a str] {
        self.lines.get(self.position..).unwrap_or_default()
    }

    /// Advances until the current line has content or the input ends.
    pub fn skip_blank_lines(&mut self) {
        while self.peek().is_some_and(is_blank) {
            self.position += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_blank_lines_stops_on_content() {
        let lines = ["", "   ", "\t", "content", ""];
        let mut cursor = LineCursor::new(&lines);
        cursor.skip_blank_lines();
        assert_eq!(cursor.position(), 3);
        assert_eq!(cursor.peek(), Some("content"));
    }

    #[test]
    fn test_advance_saturates_at_end() {
        let lines = ["only"];
        let mut cursor = LineCursor::new(&lines);
        cursor.advance();
        cursor.advance();
        assert!(cursor.is_at_end());
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.peek(), None);
        assert!(cursor.remaining().is_empty());
    }

    #[test]
    fn test_remaining_does_not_consume() {
        let lines = ["a", "b", "c"];
        let mut cursor = LineCursor::new(&lines);
        cursor.advance();
        assert_eq!(cursor.remaining(), &["b", "c"]);
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank(" \t "));
        assert!(!is_blank("  x"));
    }
}
