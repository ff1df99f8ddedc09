//! Video Source Library
//!
//! Everything the detection pipeline needs from the outside world:
//! - Raw RGB frames and finite frame sources (in-memory, image directory)
//! - Preprocessing into normalized channel-first tensors for the classifier
//! - Dense optical-flow motion scoring between consecutive frames

pub mod frame;
pub mod motion;
pub mod preprocess;
pub mod source;

pub use frame::RawFrame;
pub use motion::{FlowConfig, LucasKanadeScorer, MotionScorer};
pub use preprocess::{preprocess, PreprocessedFrame};
pub use source::{FrameSource, ImageDirSource, MemorySource, StreamMetadata};

use thiserror::Error;

/// Frame acquisition errors
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to open source: {0}")]
    Open(String),

    #[error("Failed to decode frame {index}: {reason}")]
    Decode { index: u64, reason: String },

    #[error("Read failed: {0}")]
    Read(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CaptureError {
    /// A recoverable error only loses the current frame; anything else ends the stream
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CaptureError::Decode { .. })
    }
}

/// Per-frame defects. The frame is skipped, the stream continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    #[error("Malformed frame: expected {expected} bytes, got {actual}")]
    Malformed { expected: usize, actual: usize },

    #[error("Frame has zero area ({width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("Invalid target size: {0}")]
    InvalidSize(u32),
}

/// Motion scoring failures
#[derive(Error, Debug)]
pub enum MotionError {
    #[error("Invalid frame for motion scoring: {0}")]
    InvalidFrame(#[from] FrameError),

    #[error("Flow computation failed: {0}")]
    Flow(String),
}
