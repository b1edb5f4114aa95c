//! Metric and section type definitions.
//!
//! A scan turns the text of `dumpsys meminfo` into a flat [`MetricMap`].
//! Every key is built from the [`Section`] the value came from, so the same
//! row name in two sections (for example `Native Heap` in the overview table
//! and in the app summary) stays distinguishable.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer metrics keyed by fully-qualified name.
///
/// Keys are unique within one scan; when two sections produce the same key
/// the later one wins. Iteration order carries no meaning.
pub type MetricMap = HashMap<String, i64>;

/// How the body of a [`Section`] is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionLayout {
    /// Column-aligned table: header lines, a dashed separator, then one row
    /// per line until a blank line.
    Table,
    /// Contiguous lines of `name: value` pairs, possibly several per line.
    KeyValue,
}

/// A block of `dumpsys meminfo` output that contributes metrics.
///
/// # Examples
///
/// ```
/// use androidstat_core::{Section, SectionLayout};
///
/// assert_eq!(Section::from_label("  App Summary "), Some(Section::AppSummary));
/// assert_eq!(Section::from_label("Objects:"), None);
/// assert_eq!(Section::Sql.layout(), SectionLayout::KeyValue);
/// assert_eq!(Section::Objects.metric_key("Views"), "OBJECTS Views");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Mandatory table directly after the `MEMINFO` marker line.
    Overview,
    /// Optional `App Summary` table.
    AppSummary,
    /// Optional `Objects` key/value block.
    Objects,
    /// Optional `SQL` key/value block.
    Sql,
}

impl Section {
    /// Sections that may follow the overview table, in any order.
    pub const OPTIONAL: [Section; 3] = [Section::AppSummary, Section::Objects, Section::Sql];

    /// Lowercase label line introducing the section, if it has one.
    ///
    /// The overview table is introduced by the `MEMINFO` marker instead of a
    /// label.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::Overview => None,
            Self::AppSummary => Some("app summary"),
            Self::Objects => Some("objects"),
            Self::Sql => Some("sql"),
        }
    }

    /// Prefix prepended to every metric key produced by this section.
    pub fn key_prefix(self) -> &'static str {
        match self {
            Self::Overview => "MEM ",
            Self::AppSummary => "APP ",
            Self::Objects => "OBJECTS ",
            Self::Sql => "SQL ",
        }
    }

    /// Layout of the section body.
    pub fn layout(self) -> SectionLayout {
        match self {
            Self::Overview | Self::AppSummary => SectionLayout::Table,
            Self::Objects | Self::Sql => SectionLayout::KeyValue,
        }
    }

    /// Matches a whole line against the optional section labels.
    ///
    /// The line is trimmed and compared case-insensitively; anything beyond
    /// the exact label (a trailing colon, extra words) does not match.
    pub fn from_label(line: &str) -> Option<Self> {
        let lowered = line.trim().to_lowercase();
        Self::OPTIONAL
            .into_iter()
            .find(|section| section.label() == Some(lowered.as_str()))
    }

    /// Builds the fully-qualified metric key for `name` in this section.
    pub fn metric_key(self, name: &str) -> String {
        format!("{}{name}", self.key_prefix())
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overview => write!(f, "overview"),
            Self::AppSummary => write!(f, "app summary"),
            Self::Objects => write!(f, "objects"),
            Self::Sql => write!(f, "sql"),
        }
    }
}
