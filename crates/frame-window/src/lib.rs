//! Frame Windows
//!
//! Bounded FIFO windows used by the detection pipeline:
//! - `SequenceBuffer` holds the most recent preprocessed frames for the classifier
//! - `MotionWindow` smooths per-frame motion magnitudes with a moving average

mod motion;
mod sequence;
mod window;

pub use motion::MotionWindow;
pub use sequence::SequenceBuffer;
pub use window::SlidingWindow;
