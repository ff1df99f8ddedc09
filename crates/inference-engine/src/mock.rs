//! Deterministic classifier for development and tests

use tracing::info;
use video_source::PreprocessedFrame;

use crate::{Classifier, InferenceError};

type ScoreFn = dyn Fn(&[PreprocessedFrame]) -> f64 + Send + Sync;

/// Classifier driven by a pure function of the sequence
pub struct MockClassifier {
    score: Box<ScoreFn>,
}

impl MockClassifier {
    /// Use an arbitrary scoring function
    pub fn from_fn(score: impl Fn(&[PreprocessedFrame]) -> f64 + Send + Sync + 'static) -> Self {
        Self {
            score: Box::new(score),
        }
    }

    /// Always report the same probability
    pub fn constant(probability: f64) -> Self {
        Self::from_fn(move |_| probability)
    }

    /// Probability taken from the brightness of the newest frame.
    /// Lets the pipeline run end to end without a trained model.
    pub fn brightness() -> Self {
        info!("Creating mock classifier (brightness heuristic)");
        Self::from_fn(|sequence| sequence.last().map(|f| f.mean() as f64).unwrap_or(0.0))
    }
}

impl Classifier for MockClassifier {
    fn classify(&self, sequence: &[PreprocessedFrame]) -> Result<f64, InferenceError> {
        if sequence.is_empty() {
            return Err(InferenceError::InvalidInputShape {
                expected: "non-empty sequence".to_string(),
                actual: "0 frames".to_string(),
            });
        }
        Ok((self.score)(sequence).clamp(0.0, 1.0))
    }
}
