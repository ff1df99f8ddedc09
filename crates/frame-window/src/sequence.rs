//! Classifier input buffer

use crate::SlidingWindow;

/// Ordered buffer of the last `sequence_length` preprocessed frames.
///
/// Classification is only attempted once the buffer holds exactly
/// `sequence_length` frames; from then on every push evicts one frame.
#[derive(Debug, Clone)]
pub struct SequenceBuffer<T> {
    window: SlidingWindow<T>,
}

impl<T> SequenceBuffer<T> {
    /// Create a buffer for sequences of `sequence_length` frames
    pub fn new(sequence_length: usize) -> Self {
        Self {
            window: SlidingWindow::new(sequence_length),
        }
    }

    /// Append a frame, evicting the oldest when over capacity
    pub fn push(&mut self, frame: T) {
        self.window.push(frame);
    }

    /// True once the buffer holds a full sequence
    pub fn is_full(&self) -> bool {
        self.window.is_full()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn sequence_length(&self) -> usize {
        self.window.capacity()
    }

    /// Iterate over buffered frames in arrival order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.window.iter()
    }
}

impl<T: Clone> SequenceBuffer<T> {
    /// Copy of the buffered sequence in arrival order, or `None` until full.
    /// The buffer itself is left untouched.
    pub fn snapshot(&self) -> Option<Vec<T>> {
        if !self.is_full() {
            return None;
        }
        Some(self.window.iter().cloned().collect())
    }
}
