//! Trailing moving average

use serde::{Deserialize, Serialize};

/// Rolling averages are only produced for timelines longer than this
pub const MIN_ROLLING_RECORDS: usize = 10;

/// Simple moving average aligned with the input series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingAverage {
    /// `min(requested, len / 4)`
    pub window: usize,
    /// One entry per input position; the first `window - 1` are `None`
    pub values: Vec<Option<f64>>,
}

impl RollingAverage {
    pub fn compute(series: &[f64], requested_window: usize) -> Option<Self> {
        if series.len() <= MIN_ROLLING_RECORDS {
            return None;
        }
        let window = requested_window.min(series.len() / 4);
        if window == 0 {
            return None;
        }

        let mut values = Vec::with_capacity(series.len());
        let mut sum = 0.0;
        for (i, v) in series.iter().enumerate() {
            sum += v;
            if i >= window {
                sum -= series[i - window];
            }
            if i + 1 >= window {
                values.push(Some(sum / window as f64));
            } else {
                values.push(None);
            }
        }

        Some(Self { window, values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_more_than_ten_records() {
        let series = vec![1.0; 10];
        assert!(RollingAverage::compute(&series, 3).is_none());
        assert!(RollingAverage::compute(&[1.0; 11], 3).is_some());
    }

    #[test]
    fn test_effective_window_capped_by_quarter_length() {
        let series: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let rolling = RollingAverage::compute(&series, 200).unwrap();
        assert_eq!(rolling.window, 10);
        assert_eq!(rolling.values.len(), 40);
        assert!(rolling.values[..9].iter().all(Option::is_none));
        // Mean of 0..=9
        assert_eq!(rolling.values[9], Some(4.5));
        // Mean of 30..=39
        assert_eq!(rolling.values[39], Some(34.5));
    }

    #[test]
    fn test_requested_window_used_when_smaller() {
        let series = vec![2.0; 20];
        let rolling = RollingAverage::compute(&series, 3).unwrap();
        assert_eq!(rolling.window, 3);
        assert_eq!(rolling.values[1], None);
        assert_eq!(rolling.values[2], Some(2.0));
    }

    #[test]
    fn test_zero_window_unavailable() {
        assert!(RollingAverage::compute(&[1.0; 12], 0).is_none());
    }
}
