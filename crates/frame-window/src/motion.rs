//! Motion smoothing window

use crate::SlidingWindow;

/// Moving average over the most recent motion magnitudes.
///
/// Independent of the sequence buffer: the average is taken over whatever
/// the window currently holds, full or not.
#[derive(Debug, Clone)]
pub struct MotionWindow {
    window: SlidingWindow<f64>,
}

impl MotionWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            window: SlidingWindow::new(capacity),
        }
    }

    /// Add a magnitude. Negative or non-finite input is clamped to 0.
    pub fn push(&mut self, magnitude: f64) {
        let magnitude = if magnitude.is_finite() { magnitude.max(0.0) } else { 0.0 };
        self.window.push(magnitude);
    }

    /// Arithmetic mean of current contents, 0 when empty
    pub fn average(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        self.window.iter().sum::<f64>() / self.window.len() as f64
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}
