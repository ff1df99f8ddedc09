//! Detection Timeline
//!
//! Append-only time series of fused verdicts plus the analytics derived
//! from it: violence intervals, descriptive statistics, rolling averages
//! and verdict distribution.

mod events;
mod rolling;
mod statistics;
mod summary;

pub use events::ViolenceInterval;
pub use rolling::{RollingAverage, MIN_ROLLING_RECORDS};
pub use statistics::DescriptiveStats;
pub use summary::{TimelineSummary, VerdictShare};

use std::collections::BTreeMap;

use fusion::Verdict;
use serde::{Deserialize, Serialize};

/// One fused, fully buffered frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineRecord {
    /// Seconds from stream start
    pub timestamp: f64,
    /// Classifier violence probability
    pub probability: f64,
    /// Smoothed motion score
    pub avg_motion: f64,
    pub verdict: Verdict,
}

/// Numeric series of the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesField {
    Probability,
    Motion,
}

impl SeriesField {
    fn value(&self, record: &TimelineRecord) -> f64 {
        match self {
            SeriesField::Probability => record.probability,
            SeriesField::Motion => record.avg_motion,
        }
    }
}

/// Append-only record store for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    records: Vec<TimelineRecord>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: TimelineRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TimelineRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&TimelineRecord> {
        self.records.last()
    }

    /// Values of one series in arrival order
    pub fn series(&self, field: SeriesField) -> Vec<f64> {
        self.records.iter().map(|r| field.value(r)).collect()
    }

    /// Mean, min, max and sample standard deviation of a series.
    /// `None` on an empty timeline.
    pub fn descriptive_stats(&self, field: SeriesField) -> Option<DescriptiveStats> {
        DescriptiveStats::compute(&self.series(field))
    }

    /// Maximal runs of consecutive `Violence` records
    pub fn violence_intervals(&self) -> Vec<ViolenceInterval> {
        events::extract_intervals(&self.records)
    }

    /// Trailing moving average, or `None` when the timeline is too short
    /// (see `MIN_ROLLING_RECORDS`) for the feature to be meaningful
    pub fn rolling_average(&self, field: SeriesField, requested_window: usize) -> Option<RollingAverage> {
        RollingAverage::compute(&self.series(field), requested_window)
    }

    /// Count per verdict; verdicts that never occurred are absent
    pub fn verdict_distribution(&self) -> BTreeMap<Verdict, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.verdict).or_insert(0) += 1;
        }
        counts
    }

    pub fn count(&self, verdict: Verdict) -> usize {
        self.records.iter().filter(|r| r.verdict == verdict).count()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::timeline;
    use super::*;
    use fusion::Verdict::*;

    #[test]
    fn test_append_preserves_order() {
        let t = timeline(&[Normal, Violence, FalseAlarm]);
        assert_eq!(t.len(), 3);
        let stamps: Vec<f64> = t.records().iter().map(|r| r.timestamp).collect();
        assert_eq!(stamps, vec![0.0, 1.0, 2.0]);
        assert_eq!(t.last().map(|r| r.verdict), Some(FalseAlarm));
    }

    #[test]
    fn test_series() {
        let t = timeline(&[Normal, Normal]);
        assert_eq!(t.series(SeriesField::Motion), vec![0.0, 1.0]);
    }

    #[test]
    fn test_distribution_omits_zero_counts() {
        let t = timeline(&[Normal, Violence, Normal]);
        let dist = t.verdict_distribution();
        assert_eq!(dist.get(&Normal), Some(&2));
        assert_eq!(dist.get(&Violence), Some(&1));
        assert!(!dist.contains_key(&FalseAlarm));
        assert_eq!(t.count(FalseAlarm), 0);
    }

    #[test]
    fn test_empty_timeline_guards() {
        let t = Timeline::new();
        assert!(t.descriptive_stats(SeriesField::Probability).is_none());
        assert!(t.violence_intervals().is_empty());
        assert!(t.rolling_average(SeriesField::Motion, 200).is_none());
        assert!(t.verdict_distribution().is_empty());
    }
}
