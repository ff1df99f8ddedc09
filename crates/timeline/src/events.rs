//! Violence interval extraction

use fusion::Verdict;
use serde::{Deserialize, Serialize};

use crate::TimelineRecord;

/// Maximal contiguous run of `Violence` verdicts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViolenceInterval {
    pub start: f64,
    pub end: f64,
    /// `end - start`; 0 for a single isolated record
    pub duration: f64,
}

impl ViolenceInterval {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            duration: end - start,
        }
    }
}

/// Single left-to-right scan. A run closes at the timestamp of its last
/// `Violence` record, either when a different verdict follows or when the
/// timeline ends.
pub(crate) fn extract_intervals(records: &[TimelineRecord]) -> Vec<ViolenceInterval> {
    let mut intervals = Vec::new();
    let mut open: Option<f64> = None;
    let mut last_violent = 0.0;

    for record in records {
        match (record.verdict, open) {
            (Verdict::Violence, None) => {
                open = Some(record.timestamp);
                last_violent = record.timestamp;
            }
            (Verdict::Violence, Some(_)) => last_violent = record.timestamp,
            (Verdict::FalseAlarm | Verdict::Normal, Some(start)) => {
                intervals.push(ViolenceInterval::new(start, last_violent));
                open = None;
            }
            (Verdict::FalseAlarm | Verdict::Normal, None) => {}
        }
    }

    if let Some(start) = open {
        intervals.push(ViolenceInterval::new(start, last_violent));
    }

    intervals
}

#[cfg(test)]
mod tests {
    use crate::test_support::timeline;
    use fusion::Verdict::*;
    use proptest::prelude::*;

    fn bounds(verdicts: &[fusion::Verdict]) -> Vec<(f64, f64)> {
        timeline(verdicts)
            .violence_intervals()
            .iter()
            .map(|i| (i.start, i.end))
            .collect()
    }

    #[test]
    fn test_runs_and_trailing_single() {
        assert_eq!(
            bounds(&[Normal, Violence, Violence, Normal, Violence]),
            vec![(1.0, 2.0), (4.0, 4.0)]
        );
    }

    #[test]
    fn test_no_violence() {
        assert!(bounds(&[Normal, Normal, FalseAlarm]).is_empty());
    }

    #[test]
    fn test_run_from_start_to_end() {
        assert_eq!(bounds(&[Violence, Violence, Violence]), vec![(0.0, 2.0)]);
    }

    #[test]
    fn test_false_alarm_breaks_run() {
        assert_eq!(
            bounds(&[Violence, FalseAlarm, Violence]),
            vec![(0.0, 0.0), (2.0, 2.0)]
        );
    }

    #[test]
    fn test_isolated_record_has_zero_duration() {
        let intervals = timeline(&[Normal, Violence, Normal]).violence_intervals();
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].duration, 0.0);
    }

    #[test]
    fn test_duration_is_serialized() {
        let intervals = timeline(&[Violence, Violence, Violence, Normal]).violence_intervals();
        let json = serde_json::to_value(intervals[0]).unwrap();
        assert_eq!(json["start"], 0.0);
        assert_eq!(json["end"], 2.0);
        assert_eq!(json["duration"], 2.0);
    }

    proptest! {
        #[test]
        fn prop_intervals_cover_exactly_the_violent_records(
            flags in proptest::collection::vec(any::<bool>(), 0..60)
        ) {
            let verdicts: Vec<_> = flags.iter().map(|&v| if v { Violence } else { Normal }).collect();
            let intervals = timeline(&verdicts).violence_intervals();

            // Ordered, non-overlapping, separated by at least one other record
            for pair in intervals.windows(2) {
                prop_assert!(pair[0].end + 1.0 < pair[1].start);
            }
            let covered: usize = intervals.iter().map(|i| (i.end - i.start) as usize + 1).sum();
            prop_assert_eq!(covered, flags.iter().filter(|&&v| v).count());
        }
    }
}
