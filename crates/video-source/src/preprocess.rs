//! Classifier input preprocessing

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgb};
use ndarray::Array3;

use crate::{FrameError, RawFrame};

/// Resized, normalized, channel-first frame (3 x size x size, values in [0, 1])
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedFrame {
    tensor: Array3<f32>,
}

impl PreprocessedFrame {
    /// Wrap an existing tensor. Shape must be (3, size, size).
    pub fn from_tensor(tensor: Array3<f32>) -> Result<Self, FrameError> {
        let (c, h, w) = tensor.dim();
        if c != 3 || h != w || h == 0 {
            return Err(FrameError::InvalidSize(h as u32));
        }
        Ok(Self { tensor })
    }

    /// Side length of the square frame
    pub fn size(&self) -> usize {
        self.tensor.dim().1
    }

    pub fn tensor(&self) -> &Array3<f32> {
        &self.tensor
    }

    /// Values in (channel, row, column) order
    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.tensor.iter().copied()
    }

    /// Mean over all channels and pixels
    pub fn mean(&self) -> f32 {
        self.tensor.mean().unwrap_or(0.0)
    }
}

/// Resize a raw frame to `image_size` x `image_size` and scale to [0, 1]
pub fn preprocess(frame: &RawFrame, image_size: u32) -> Result<PreprocessedFrame, FrameError> {
    if image_size == 0 {
        return Err(FrameError::InvalidSize(image_size));
    }
    frame.validate()?;

    let img = ImageBuffer::<Rgb<u8>, _>::from_raw(frame.width, frame.height, frame.data.as_slice())
        .ok_or(FrameError::Malformed {
            expected: frame.expected_len(),
            actual: frame.data.len(),
        })?;

    let resized = imageops::resize(&img, image_size, image_size, FilterType::Triangle);

    let side = image_size as usize;
    let mut tensor = Array3::<f32>::zeros((3, side, side));
    for (x, y, pixel) in resized.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        tensor[[0, y, x]] = pixel[0] as f32 / 255.0;
        tensor[[1, y, x]] = pixel[1] as f32 / 255.0;
        tensor[[2, y, x]] = pixel[2] as f32 / 255.0;
    }

    Ok(PreprocessedFrame { tensor })
}
