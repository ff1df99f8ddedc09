//! Raw video frame

use crate::FrameError;

/// Decoded RGB video frame, as produced by a frame source
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    /// RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Position in the stream (0-based, assigned by the source)
    pub sequence: u64,
}

impl RawFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        Self {
            data,
            width,
            height,
            sequence,
        }
    }

    /// Uniformly colored frame
    pub fn filled(width: u32, height: u32, rgb: [u8; 3], sequence: u64) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take((width * height * 3) as usize)
            .collect();
        Self::new(data, width, height, sequence)
    }

    /// Expected length of `data` for the declared dimensions
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    /// Check the buffer matches the declared dimensions
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.width == 0 || self.height == 0 {
            return Err(FrameError::Empty {
                width: self.width,
                height: self.height,
            });
        }
        if self.data.len() != self.expected_len() {
            return Err(FrameError::Malformed {
                expected: self.expected_len(),
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        self.data.get(idx..idx + 3).map(|p| [p[0], p[1], p[2]])
    }

    /// Convert to grayscale
    pub fn to_grayscale(&self) -> Vec<u8> {
        self.data
            .chunks_exact(3)
            .map(|pixel| {
                // Luminance formula: 0.299*R + 0.587*G + 0.114*B
                (pixel[0] as f32 * 0.299 + pixel[1] as f32 * 0.587 + pixel[2] as f32 * 0.114)
                    as u8
            })
            .collect()
    }
}
