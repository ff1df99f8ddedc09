//! ONNX sequence classifier

use std::path::Path;

use tract_onnx::prelude::*;
use tracing::{debug, info};
use video_source::PreprocessedFrame;

use crate::{softmax, Classifier, InferenceError};

/// Index of the violence class in two-logit outputs
const VIOLENCE_CLASS: usize = 1;

/// Runs a `[1, N, 3, S, S]` sequence model exported to ONNX
pub struct OnnxClassifier {
    model: TypedRunnableModel<TypedModel>,
    sequence_length: usize,
    image_size: usize,
}

impl OnnxClassifier {
    /// Load and optimize the model for a fixed input shape
    pub fn load(
        path: impl AsRef<Path>,
        sequence_length: usize,
        image_size: usize,
    ) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        info!("Loading sequence model from {}", path.display());

        let shape = [1, sequence_length, 3, image_size, image_size];
        let model = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|m| m.with_input_fact(0, f32::fact(shape).into()))
            .and_then(|m| m.into_optimized())
            .and_then(|m| m.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(e.to_string()))?;

        info!("Model loaded successfully");
        Ok(Self {
            model,
            sequence_length,
            image_size,
        })
    }

    fn to_input(&self, sequence: &[PreprocessedFrame]) -> Result<Tensor, InferenceError> {
        if sequence.len() != self.sequence_length {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{} frames", self.sequence_length),
                actual: format!("{} frames", sequence.len()),
            });
        }
        if let Some(bad) = sequence.iter().find(|f| f.size() != self.image_size) {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{0}x{0}", self.image_size),
                actual: format!("{0}x{0}", bad.size()),
            });
        }

        let data: Vec<f32> = sequence.iter().flat_map(|f| f.values()).collect();
        let s = self.image_size;
        let array = tract_ndarray::Array5::from_shape_vec((1, self.sequence_length, 3, s, s), data)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
        Ok(array.into())
    }
}

impl Classifier for OnnxClassifier {
    fn classify(&self, sequence: &[PreprocessedFrame]) -> Result<f64, InferenceError> {
        let input = self.to_input(sequence)?;

        let outputs = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::InvalidOutput("model produced no outputs".into()))?;
        let values: Vec<f32> = output
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::InvalidOutput(e.to_string()))?
            .iter()
            .copied()
            .collect();

        let probability = match values.len() {
            1 => (values[0] as f64).clamp(0.0, 1.0),
            2 => softmax(&values)[VIOLENCE_CLASS],
            n => {
                return Err(InferenceError::InvalidOutput(format!(
                    "expected 1 or 2 values, got {}",
                    n
                )))
            }
        };

        debug!(probability, "sequence classified");
        Ok(probability)
    }
}
