//! Moving-average trend tracking.
//!
//! Each metric keeps three exponentially weighted moving averages with
//! different reaction speeds plus its last raw value. Updating a metric
//! reports how far each average moved, giving a slow/medium/fast/instant view
//! of the metric without storing any history.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// `(decay, weight)` pairs for the three averages, slowest first.
const P1000: (f64, f64) = (0.999, 0.001);
const P100: (f64, f64) = (0.99, 0.01);
const P10: (f64, f64) = (0.9, 0.1);

/// Movement of one metric caused by a single update.
///
/// `p1000`, `p100` and `p10` are the changes of the averages that take in
/// 0.1%, 1% and 10% of each new value; `p1` is the change against the
/// previous raw value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendDelta {
    pub p1000: f64,
    pub p100: f64,
    pub p10: f64,
    pub p1: f64,
}

impl TrendDelta {
    /// No movement on any window.
    pub const ZERO: Self = Self {
        p1000: 0.0,
        p100: 0.0,
        p10: 0.0,
        p1: 0.0,
    };
}

/// Accumulators for a single metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    p1000: f64,
    p100: f64,
    p10: f64,
    p1: f64,
}

impl Trend {
    /// Starts a trend with every accumulator at `value`.
    pub fn seeded(value: i64) -> Self {
        let value = value as f64;
        Self {
            p1000: value,
            p100: value,
            p10: value,
            p1: value,
        }
    }

    /// Folds `value` into the averages and returns how far each moved.
    pub fn advance(&mut self, value: i64) -> TrendDelta {
        let value = value as f64;
        let previous = *self;

        self.p1000 = blend(self.p1000, value, P1000);
        self.p100 = blend(self.p100, value, P100);
        self.p10 = blend(self.p10, value, P10);
        self.p1 = value;

        TrendDelta {
            p1000: self.p1000 - previous.p1000,
            p100: self.p100 - previous.p100,
            p10: self.p10 - previous.p10,
            p1: self.p1 - previous.p1,
        }
    }

    pub fn p1000(&self) -> f64 {
        self.p1000
    }

    pub fn p100(&self) -> f64 {
        self.p100
    }

    pub fn p10(&self) -> f64 {
        self.p10
    }

    /// Last raw value folded into the trend.
    pub fn last(&self) -> f64 {
        self.p1
    }
}

fn blend(acc: f64, value: f64, (decay, weight): (f64, f64)) -> f64 {
    acc * decay + value * weight
}

/// Trend state for every metric seen by one owner.
///
/// State lives as long as the tracker; there is no reset other than
/// creating a new tracker. Callers sharing a tracker across threads must
/// serialize access themselves.
///
/// # Examples
///
/// ```
/// use androidstat_core::{TrendDelta, TrendTracker};
///
/// let mut trends = TrendTracker::new();
/// assert_eq!(trends.update("X", 100), TrendDelta::ZERO);
/// assert_eq!(trends.update("X", 100), TrendDelta::ZERO);
///
/// let delta = trends.update("X", 200);
/// assert_eq!(delta.p1, 100.0);
/// assert!(delta.p1000 < delta.p100 && delta.p100 < delta.p10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TrendTracker {
    trends: HashMap<String, Trend>,
}

impl TrendTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` for `key` and returns the movement it caused.
    ///
    /// The first value seen for a key seeds its trend and reports
    /// [`TrendDelta::ZERO`].
    pub fn update(&mut self, key: &str, value: i64) -> TrendDelta {
        match self.trends.get_mut(key) {
            Some(trend) => trend.advance(value),
            None => {
                self.trends.insert(key.to_string(), Trend::seeded(value));
                TrendDelta::ZERO
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Trend> {
        self.trends.get(key)
    }

    /// Number of metrics with trend state.
    pub fn len(&self) -> usize {
        self.trends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trends.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_first_update_seeds_all_accumulators() {
        let mut trends = TrendTracker::new();
        assert_eq!(trends.update("MEM TOTAL Pss Total", 100), TrendDelta::ZERO);

        let trend = trends.get("MEM TOTAL Pss Total").unwrap();
        assert_eq!(trend.p1000(), 100.0);
        assert_eq!(trend.p100(), 100.0);
        assert_eq!(trend.p10(), 100.0);
        assert_eq!(trend.last(), 100.0);
    }

    #[test]
    fn test_repeated_value_reports_no_movement() {
        let mut trends = TrendTracker::new();
        trends.update("X", 100);
        assert_eq!(trends.update("X", 100), TrendDelta::ZERO);
    }

    #[test]
    fn test_step_moves_slow_windows_least() {
        let mut trends = TrendTracker::new();
        trends.update("X", 100);
        let delta = trends.update("X", 200);

        assert_eq!(delta.p1, 100.0);
        assert!(close(delta.p1000, 0.1));
        assert!(close(delta.p100, 1.0));
        assert!(close(delta.p10, 10.0));
        for window in [delta.p1000, delta.p100, delta.p10] {
            assert!(window > 0.0 && window < 100.0);
        }
        assert!(delta.p1000 < delta.p100 && delta.p100 < delta.p10);
    }

    #[test]
    fn test_state_commits_between_updates() {
        let mut trends = TrendTracker::new();
        trends.update("X", 100);
        trends.update("X", 200);
        let delta = trends.update("X", 150);

        assert_eq!(delta.p1, -50.0);
        // Still above the fast average, so it keeps rising.
        assert!(delta.p10 > 0.0);
        let trend = trends.get("X").unwrap();
        assert!(close(trend.p10(), 110.0 * 0.9 + 15.0));
        assert_eq!(trend.last(), 150.0);
    }

    #[test]
    fn test_keys_are_tracked_independently() {
        let mut trends = TrendTracker::new();
        trends.update("A", 10);
        trends.update("B", 1000);
        let delta = trends.update("A", 20);

        assert_eq!(delta.p1, 10.0);
        assert_eq!(trends.get("B").unwrap().last(), 1000.0);
        assert_eq!(trends.len(), 2);
    }
}
