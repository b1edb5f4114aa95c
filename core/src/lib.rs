//! Core metric types shared by the androidstat crates.
//!
//! This crate defines the foundational pieces every consumer of a memory
//! scan needs:
//!
//! - [`MetricMap`]: integer metrics keyed by their fully-qualified name
//!   (for example `"MEM Native Heap Pss Total"`).
//! - [`Section`]: the labelled blocks of `dumpsys meminfo` output that
//!   contribute metrics, with their key prefix and body layout.
//! - [`TrendTracker`]: per-metric moving averages reporting how fast each
//!   value is moving across successive scans.
//! - [`ScanError`]: the fatal outcomes of a scan.
//!
//! # Example
//!
//! ```
//! use androidstat_core::*;
//!
//! let mut metrics = MetricMap::new();
//! metrics.insert(Section::Overview.metric_key("Native Heap Pss Total"), 10468);
//! assert_eq!(metrics["MEM Native Heap Pss Total"], 10468);
//!
//! let mut trends = TrendTracker::new();
//! assert_eq!(trends.update("MEM Native Heap Pss Total", 10468), TrendDelta::ZERO);
//! let delta = trends.update("MEM Native Heap Pss Total", 10568);
//! assert_eq!(delta.p1, 100.0);
//! ```

mod error;
mod trend;
mod types;

pub use error::ScanError;
pub use trend::{Trend, TrendDelta, TrendTracker};
pub use types::*;
