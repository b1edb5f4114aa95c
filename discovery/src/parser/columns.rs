//! Column boundary detection for whitespace-aligned tables.
//!
//! `dumpsys` right-aligns every column under its header, so the offset where
//! a header word ends is also where every value of that column ends. All
//! offsets here count characters, not bytes.

use std::collections::BTreeSet;

/// Offsets just past the end of every word in `line`.
///
/// Leading whitespace is skipped; a word ends where whitespace begins or at
/// the end of the line.
pub fn word_ends(line: &str) -> Vec<usize> {
    let mut ends = Vec::new();
    let mut in_word = false;
    let mut len = 0;
    for (offset, ch) in line.chars().enumerate() {
        len = offset + 1;
        if ch.is_whitespace() {
            if in_word {
                ends.push(offset);
                in_word = false;
            }
        } else {
            in_word = true;
        }
    }
    if in_word {
        ends.push(len);
    }
    ends
}

/// Offset just past the leading name of a data row.
///
/// Words separated by a single space belong to the same name, so
/// `"  Native Heap    10468"` yields 13. A following word that ends at or
/// past `limit` (the first column boundary) is a value printed one space
/// after the name and is not joined. Returns 0 for a blank line.
pub fn name_end(line: &str, limit: usize) -> usize {
    let chars: Vec<char> = line.chars().collect();
    let Some(start) = chars.iter().position(|ch| !ch.is_whitespace()) else {
        return 0;
    };
    let mut end = word_end(&chars, start);
    while chars.get(end) == Some(&' ')
        && chars
            .get(end + 1)
            .is_some_and(|next| !next.is_whitespace())
    {
        let next_end = word_end(&chars, end + 1);
        if next_end >= limit {
            break;
        }
        end = next_end;
    }
    end
}

fn word_end(chars: &[char], start: usize) -> usize {
    chars[start..]
        .iter()
        .position(|ch| ch.is_whitespace())
        .map_or(chars.len(), |offset| start + offset)
}

/// Strictly increasing column-end offsets of one table header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnBoundaries {
    ends: Vec<usize>,
}

impl ColumnBoundaries {
    /// Unions the word ends of every header line.
    ///
    /// An empty result means no header line held a word and the table is
    /// malformed.
    pub fn detect(header_lines: &[&str]) -> Self {
        let ends: BTreeSet<usize> = header_lines
            .iter()
            .flat_map(|line| word_ends(line))
            .collect();
        Self {
            ends: ends.into_iter().collect(),
        }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.ends
    }

    pub fn len(&self) -> usize {
        self.ends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// End of the leftmost column.
    pub fn first(&self) -> Option<usize> {
        self.ends.first().copied()
    }

    /// Column names, one per boundary.
    ///
    /// Each header line is cut at the boundaries and the non-empty pieces of
    /// every column are joined with a space, top line first, so `Private`
    /// above `Dirty` becomes `Private Dirty`.
    pub fn header_names(&self, header_lines: &[&str]) -> Vec<String> {
        let mut names = vec![Vec::new(); self.ends.len()];
        for line in header_lines {
            let chars: Vec<char> = line.chars().collect();
            let mut start = 0;
            for (column, &end) in self.ends.iter().enumerate() {
                let piece = slice_trimmed(&chars, start, end);
                if !piece.is_empty() {
                    names[column].push(piece);
                }
                start = end;
            }
        }
        names.into_iter().map(|pieces| pieces.join(" ")).collect()
    }

    /// Splits a data row into its name and one field per column.
    ///
    /// The name spans `[0, name_width)`, each column runs up to its
    /// boundary, and the last column takes the rest of the line. A column
    /// starting at or past the end of the line is not produced, so a row
    /// that stops short yields fewer fields than the header has columns.
    pub fn split_row(&self, line: &str, name_width: usize) -> Vec<String> {
        let chars: Vec<char> = line.chars().collect();
        let mut fields = vec![slice_trimmed(&chars, 0, name_width)];
        let mut start = name_width;
        for (column, &end) in self.ends.iter().enumerate() {
            if start >= chars.len() {
                break;
            }
            let stop = if column + 1 == self.ends.len() {
                chars.len()
            } else {
                end
            };
            fields.push(slice_trimmed(&chars, start, stop));
            start = end;
        }
        fields
    }

    /// Returns `true` if the name cut or a column boundary falls inside a
    /// word of `line`, meaning the row does not line up with the header.
    pub fn cuts_word(&self, line: &str, name_width: usize) -> bool {
        let chars: Vec<char> = line.chars().collect();
        let splits = |cut: usize| {
            cut > 0
                && cut < chars.len()
                && !chars[cut - 1].is_whitespace()
                && !chars[cut].is_whitespace()
        };
        splits(name_width) || self.ends.iter().any(|&end| splits(end))
    }
}

fn slice_trimmed(chars: &[char], start: usize, end: usize) -> String {
    let end = end.min(chars.len());
    if start >= end {
        return String::new();
    }
    chars[start..end]
        .iter()
        .collect::<String>()
        .trim()
        .to_string()
}
