//! Detailed end-of-run report over a timeline

use fusion::Verdict;
use serde::{Deserialize, Serialize};

use crate::{DescriptiveStats, RollingAverage, SeriesField, Timeline, ViolenceInterval};

/// Count and proportion of one verdict
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerdictShare {
    pub verdict: Verdict,
    pub count: usize,
    /// Percentage of all timeline records
    pub percent: f64,
}

/// Everything derived from a finished (or snapshotted) timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSummary {
    pub total_records: usize,
    pub shares: Vec<VerdictShare>,
    pub probability: Option<DescriptiveStats>,
    pub motion: Option<DescriptiveStats>,
    pub intervals: Vec<ViolenceInterval>,
    pub rolling_probability: Option<RollingAverage>,
    pub rolling_motion: Option<RollingAverage>,
}

impl TimelineSummary {
    pub fn from_timeline(timeline: &Timeline, rolling_window: usize) -> Self {
        let total = timeline.len();
        let shares = timeline
            .verdict_distribution()
            .into_iter()
            .map(|(verdict, count)| VerdictShare {
                verdict,
                count,
                percent: count as f64 / total as f64 * 100.0,
            })
            .collect();

        Self {
            total_records: total,
            shares,
            probability: timeline.descriptive_stats(SeriesField::Probability),
            motion: timeline.descriptive_stats(SeriesField::Motion),
            intervals: timeline.violence_intervals(),
            rolling_probability: timeline.rolling_average(SeriesField::Probability, rolling_window),
            rolling_motion: timeline.rolling_average(SeriesField::Motion, rolling_window),
        }
    }

    pub fn share(&self, verdict: Verdict) -> Option<&VerdictShare> {
        self.shares.iter().find(|s| s.verdict == verdict)
    }

    /// Total seconds covered by violence intervals
    pub fn violent_seconds(&self) -> f64 {
        self.intervals.iter().map(|i| i.duration).sum()
    }
}
