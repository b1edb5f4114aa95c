//! Output formatting for scanned metrics.
//!
//! Keys are always emitted in ascending order so repeated captures diff
//! cleanly.

use std::collections::BTreeMap;

use androidstat_core::MetricMap;
use regex::Regex;
use serde::Serialize;

use crate::engine::MeminfoSnapshot;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
}

#[derive(Serialize)]
struct SnapshotView<'a> {
    package: &'a str,
    pid: u32,
    captured_at: String,
    metrics: BTreeMap<&'a str, i64>,
}

/// Returns the metrics matching `filter` (all of them when `None`), ordered
/// by key.
pub fn select_metrics<'a>(metrics: &'a MetricMap, filter: Option<&Regex>) -> BTreeMap<&'a str, i64> {
    metrics
        .iter()
        .filter(|(key, _)| filter.is_none_or(|re| re.is_match(key)))
        .map(|(key, &value)| (key.as_str(), value))
        .collect()
}

/// Formats a metric map in the requested output format.
pub fn format_metrics(
    metrics: &MetricMap,
    filter: Option<&Regex>,
    format: OutputFormat,
) -> Result<String, String> {
    let selected = select_metrics(metrics, filter);
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&selected)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(&selected).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Table => Ok(metrics_to_table(&selected)),
    }
}

/// Formats a captured snapshot in the requested output format.
pub fn format_snapshot(
    snapshot: &MeminfoSnapshot,
    filter: Option<&Regex>,
    format: OutputFormat,
) -> Result<String, String> {
    let view = SnapshotView {
        package: &snapshot.package,
        pid: snapshot.pid,
        captured_at: snapshot.captured_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        metrics: select_metrics(&snapshot.metrics, filter),
    };
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&view)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(&view).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Table => {
            let mut out = format!(
                "Package: {}  Pid: {}  Captured: {}\n\n",
                view.package, view.pid, view.captured_at
            );
            out.push_str(&metrics_to_table(&view.metrics));
            Ok(out)
        }
    }
}

fn metrics_to_table(metrics: &BTreeMap<&str, i64>) -> String {
    if metrics.is_empty() {
        return "No metrics.\n".to_string();
    }

    let name_width = metrics.keys().map(|k| k.len()).max().unwrap_or(4).max(4);
    let value_width = metrics
        .values()
        .map(|v| v.to_string().len())
        .max()
        .unwrap_or(5)
        .max(5);

    let mut out = format!("{:<name_width$}  {:>value_width$}\n", "Name", "Value");
    out.push_str(&format!(
        "{}  {}\n",
        "-".repeat(name_width),
        "-".repeat(value_width)
    ));
    for (key, value) in metrics {
        out.push_str(&format!("{key:<name_width$}  {value:>value_width$}\n"));
    }
    out
}
