//! Descriptive statistics over a timeline series

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    /// Sample standard deviation (n - 1); 0 for a single value
    pub std_dev: f64,
    pub count: usize,
}

impl DescriptiveStats {
    /// `None` for an empty slice
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let min = values.iter().cloned().fold(f64::MAX, f64::min);
        let max = values.iter().cloned().fold(f64::MIN, f64::max);

        let std_dev = if values.len() > 1 {
            let m2: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
            (m2 / (n - 1.0)).sqrt()
        } else {
            0.0
        };

        Some(Self {
            mean,
            max,
            min,
            std_dev,
            count: values.len(),
        })
    }
}
