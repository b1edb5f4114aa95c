//! Tool configuration.
//!
//! Defines the YAML-serializable settings shared by the device reader and
//! the command-line front end. Every field is optional in the file.
//!
//! # Example YAML
//!
//! ```yaml
//! adb_path: /opt/android-sdk/platform-tools/adb
//! timeout_ms: 10000
//! interval_secs: 5
//! filter: "^MEM .* Pss"
//! output_filter: "^(MEM|APP) "
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Executable used when no adb path is configured.
pub const DEFAULT_ADB_PATH: &str = "adb";

/// Time a single device command may take (milliseconds).
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Settings for capturing and presenting memory statistics.
///
/// # Examples
///
/// ```
/// use androidstat_discovery::config::StatConfig;
///
/// let config: StatConfig = serde_yaml::from_str("interval_secs: 5").unwrap();
/// assert_eq!(config.adb_path, "adb");
/// assert_eq!(config.interval_secs, 5);
/// assert!(config.filter.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatConfig {
    /// Path to the `adb` executable.
    pub adb_path: String,
    /// Timeout for each `adb` invocation in milliseconds.
    pub timeout_ms: u64,
    /// Refresh interval in seconds; 0 captures once.
    pub interval_secs: u64,
    /// Regex selecting which metrics are displayed.
    pub filter: Option<String>,
    /// Regex selecting which metrics are written to the CSV file.
    pub output_filter: Option<String>,
}

impl Default for StatConfig {
    fn default() -> Self {
        Self {
            adb_path: DEFAULT_ADB_PATH.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            interval_secs: 0,
            filter: None,
            output_filter: None,
        }
    }
}

impl StatConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ReaderError::IoError) if the file cannot be
    /// read, or [`YamlError`](crate::ReaderError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// The configured adb path, falling back to [`DEFAULT_ADB_PATH`] when
    /// blank.
    pub fn adb_path(&self) -> &str {
        let trimmed = self.adb_path.trim();
        if trimmed.is_empty() {
            DEFAULT_ADB_PATH
        } else {
            trimmed
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Compiles the display filter.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFilter`](crate::ReaderError::InvalidFilter) if the
    /// pattern does not compile.
    pub fn filter_regex(&self) -> Result<Option<Regex>> {
        compile_optional(self.filter.as_deref())
    }

    /// Compiles the CSV column filter.
    pub fn output_filter_regex(&self) -> Result<Option<Regex>> {
        compile_optional(self.output_filter.as_deref())
    }
}

fn compile_optional(pattern: Option<&str>) -> Result<Option<Regex>> {
    match pattern.map(str::trim) {
        Some(pattern) if !pattern.is_empty() => Ok(Some(Regex::new(pattern)?)),
        _ => Ok(None),
    }
}
