//! Error types for device probing and scan orchestration.
//!
//! Covers every failure of one capture: running `adb`, locating the
//! process, reading configuration, and the fatal scan outcomes from
//! [`ScanError`].

use androidstat_core::ScanError;
use thiserror::Error;

/// Errors that can occur while capturing and scanning memory statistics.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// Spawning a command or reading/writing a file failed.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration could not be parsed or serialized.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A metric filter is not a valid regular expression.
    #[error("invalid filter: {0}")]
    InvalidFilter(#[from] regex::Error),

    /// The package name was empty.
    #[error("invalid package name")]
    InvalidPackage,

    /// No running process matched the package.
    #[error("process not found: {0}")]
    ProcessNotFound(String),

    /// A device command did not finish in time and was killed.
    #[error("`{command}` timed out after {timeout_ms}ms")]
    Timeout { command: String, timeout_ms: u64 },

    /// A device command exited unsuccessfully.
    #[error("`{command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// The captured output could not be scanned.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Convenience alias for results with [`ReaderError`].
pub type Result<T> = std::result::Result<T, ReaderError>;
