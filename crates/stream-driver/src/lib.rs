//! Stream Driver
//!
//! Runs one pass over a frame source, advancing every stage per frame in
//! strict order:
//! 1. motion score against the previous frame, smoothed by `MotionWindow`
//! 2. preprocessing into the `SequenceBuffer`
//! 3. classification once the buffer is full
//! 4. fusion into a verdict and a `Timeline` record
//! 5. periodic read-only snapshots to a `ReportSink`

pub mod config;
pub mod driver;
pub mod report;
pub mod sink;

pub use config::{ConfigError, DetectionConfig};
pub use driver::{FrameOutcome, SkipReason, StreamDriver};
pub use report::{FrameCounters, RunOutcome, RunReport, Termination};
pub use sink::{NullSink, Progress, ReportSink, TracingSink};

use inference_engine::InferenceError;
use thiserror::Error;
use video_source::MotionError;

/// Run-fatal errors. Per-frame defects never surface here; they are
/// reported as `FrameOutcome::Skipped`.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Classifier failed: {0}")]
    Classifier(#[from] InferenceError),

    #[error("Motion scorer failed: {0}")]
    Motion(#[from] MotionError),
}
