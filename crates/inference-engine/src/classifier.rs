//! Classifier capability

use video_source::PreprocessedFrame;

use crate::InferenceError;

/// Maps an ordered sequence of preprocessed frames to the probability of
/// the violence class, in [0, 1].
///
/// Implementations must be deterministic for identical input and free of
/// side effects visible to the caller.
pub trait Classifier {
    fn classify(&self, sequence: &[PreprocessedFrame]) -> Result<f64, InferenceError>;
}

impl<C: Classifier + ?Sized> Classifier for &C {
    fn classify(&self, sequence: &[PreprocessedFrame]) -> Result<f64, InferenceError> {
        (**self).classify(sequence)
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn classify(&self, sequence: &[PreprocessedFrame]) -> Result<f64, InferenceError> {
        (**self).classify(sequence)
    }
}

/// Numerically stable softmax
pub fn softmax(logits: &[f32]) -> Vec<f64> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max) as f64;
    let exps: Vec<f64> = logits.iter().map(|&l| (l as f64 - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
