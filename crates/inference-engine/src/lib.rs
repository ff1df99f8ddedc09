//! Sequence Inference Engine
//!
//! The classifier is consumed as an opaque capability: a full sequence of
//! preprocessed frames in, a violence probability out.

mod classifier;
mod mock;
#[cfg(feature = "onnx")]
mod onnx;

pub use classifier::{softmax, Classifier};
pub use mock::MockClassifier;
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;

use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Unexpected model output: {0}")]
    InvalidOutput(String),
}
