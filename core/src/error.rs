//! Fatal scan outcomes.

use thiserror::Error;

/// Errors that abort a scan.
///
/// Everything else that can go wrong while reading `dumpsys meminfo` output
/// (a malformed optional table, a key/value run cut short, an unparseable
/// cell) degrades to fewer metrics instead of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScanError {
    /// No `** MEMINFO in pid <pid> [<name>] **` marker line was found.
    #[error("invalid response format (no memory overview found)")]
    OverviewNotFound,
    /// The overview table after the marker was malformed or produced no
    /// metrics.
    #[error("invalid response format (no memory info found)")]
    NoMemoryInfo,
}
