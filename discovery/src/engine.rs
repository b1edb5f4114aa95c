//! Capture loop plumbing: pid lookup, dump, scan, and trend tracking.

use androidstat_core::{MetricMap, TrendDelta, TrendTracker};
use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{info, warn};

use crate::adb::AdbReader;
use crate::error::Result;
use crate::parse_meminfo_lines;

/// Metrics captured from one `dumpsys meminfo` run.
#[derive(Debug, Clone, Serialize)]
pub struct MeminfoSnapshot {
    pub package: String,
    pub pid: u32,
    pub captured_at: DateTime<Local>,
    pub metrics: MetricMap,
}

/// Captures snapshots for a package and keeps per-metric trends across
/// captures.
#[derive(Debug)]
pub struct MetricsEngine {
    reader: AdbReader,
    trends: TrendTracker,
}

impl MetricsEngine {
    pub fn new(reader: AdbReader) -> Self {
        Self {
            reader,
            trends: TrendTracker::new(),
        }
    }

    pub fn reader(&self) -> &AdbReader {
        &self.reader
    }

    /// Resolves the pid of `package`, dumps its meminfo and scans it.
    ///
    /// # Errors
    ///
    /// Propagates device failures and the fatal scan outcomes.
    pub fn scan(&self, package: &str) -> Result<MeminfoSnapshot> {
        let pid = self.reader.pid_of(package)?;
        let lines = self.reader.dump_meminfo(pid)?;
        let captured_at = Local::now();

        let metrics = parse_meminfo_lines(&lines).inspect_err(|e| {
            warn!(package, pid, error = %e, "Failed to scan meminfo output");
        })?;

        info!(package, pid, metrics = metrics.len(), "Captured meminfo");
        Ok(MeminfoSnapshot {
            package: package.trim().to_string(),
            pid,
            captured_at,
            metrics,
        })
    }

    /// Lists running processes on the device.
    pub fn packages(&self) -> Result<Vec<String>> {
        self.reader.packages()
    }

    /// Feeds one observation into the trend for `key`.
    pub fn trend(&mut self, key: &str, value: i64) -> TrendDelta {
        self.trends.update(key, value)
    }

    /// Feeds every metric of `snapshot` into the trends, returning the
    /// deltas keyed like the metrics.
    pub fn record(&mut self, snapshot: &MeminfoSnapshot) -> Vec<(String, i64, TrendDelta)> {
        let mut rows: Vec<_> = snapshot
            .metrics
            .iter()
            .map(|(key, &value)| (key.clone(), value, self.trend(key, value)))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }

    pub fn trends(&self) -> &TrendTracker {
        &self.trends
    }
}
