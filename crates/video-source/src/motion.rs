//! Optical-flow motion scoring

use image::imageops::{self, FilterType};
use image::GrayImage;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{MotionError, RawFrame};

/// Scores how much moves between two consecutive frames.
///
/// Implementations must return 0 when there is no previous frame and
/// never return a negative magnitude.
pub trait MotionScorer {
    fn score(&self, previous: Option<&RawFrame>, current: &RawFrame) -> Result<f64, MotionError>;
}

impl<M: MotionScorer + ?Sized> MotionScorer for &M {
    fn score(&self, previous: Option<&RawFrame>, current: &RawFrame) -> Result<f64, MotionError> {
        (**self).score(previous, current)
    }
}

impl<M: MotionScorer + ?Sized> MotionScorer for Box<M> {
    fn score(&self, previous: Option<&RawFrame>, current: &RawFrame) -> Result<f64, MotionError> {
        (**self).score(previous, current)
    }
}

/// Dense flow parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Frames are downscaled to this width (aspect kept) before flow
    pub target_width: u32,
    /// Half-size of the Lucas-Kanade integration window
    pub window_radius: u32,
    /// Pixels whose structure tensor has a smaller eigenvalue get zero flow
    pub min_eigenvalue: f64,
    /// Per-pixel flow magnitude cap (pixels)
    pub max_magnitude: f64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            target_width: 320,
            window_radius: 2,
            min_eigenvalue: 1.0,
            max_magnitude: 20.0,
        }
    }
}

/// Dense Lucas-Kanade optical flow; the score is the mean flow magnitude
#[derive(Debug, Clone, Default)]
pub struct LucasKanadeScorer {
    config: FlowConfig,
}

impl LucasKanadeScorer {
    pub fn new(config: FlowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    fn downscale(&self, frame: &RawFrame, width: u32, height: u32) -> Result<GrayImage, MotionError> {
        frame.validate()?;
        let gray = GrayImage::from_raw(frame.width, frame.height, frame.to_grayscale())
            .ok_or_else(|| MotionError::Flow("grayscale buffer size mismatch".into()))?;
        if gray.dimensions() == (width, height) {
            return Ok(gray);
        }
        Ok(imageops::resize(&gray, width, height, FilterType::Triangle))
    }

    fn target_dims(&self, frame: &RawFrame) -> (u32, u32) {
        let width = self.config.target_width.max(1);
        let scale = width as f64 / frame.width.max(1) as f64;
        let height = ((frame.height as f64 * scale).round() as u32).max(1);
        (width, height)
    }

    fn mean_flow(&self, prev: &GrayImage, curr: &GrayImage) -> f64 {
        let (w, h) = prev.dimensions();
        let (w, h) = (w as usize, h as usize);

        let gx = horizontal_sobel(prev);
        let gy = vertical_sobel(prev);

        // Structure tensor and mismatch terms, per pixel
        let mut terms = [
            vec![0.0f64; w * h], // Ixx
            vec![0.0f64; w * h], // Iyy
            vec![0.0f64; w * h], // Ixy
            vec![0.0f64; w * h], // Ixt
            vec![0.0f64; w * h], // Iyt
        ];
        for y in 0..h {
            for x in 0..w {
                let i = y * w + x;
                // Sobel responds with 8x the central difference
                let ix = gx.get_pixel(x as u32, y as u32)[0] as f64 / 8.0;
                let iy = gy.get_pixel(x as u32, y as u32)[0] as f64 / 8.0;
                let it = curr.get_pixel(x as u32, y as u32)[0] as f64
                    - prev.get_pixel(x as u32, y as u32)[0] as f64;
                terms[0][i] = ix * ix;
                terms[1][i] = iy * iy;
                terms[2][i] = ix * iy;
                terms[3][i] = ix * it;
                terms[4][i] = iy * it;
            }
        }
        let tables: Vec<SummedArea> = terms.iter().map(|t| SummedArea::new(t, w, h)).collect();

        let r = self.config.window_radius as usize;
        let mut total = 0.0;
        for y in 0..h {
            let (y0, y1) = (y.saturating_sub(r), (y + r + 1).min(h));
            for x in 0..w {
                let (x0, x1) = (x.saturating_sub(r), (x + r + 1).min(w));
                let sxx = tables[0].sum(x0, y0, x1, y1);
                let syy = tables[1].sum(x0, y0, x1, y1);
                let sxy = tables[2].sum(x0, y0, x1, y1);
                let sxt = tables[3].sum(x0, y0, x1, y1);
                let syt = tables[4].sum(x0, y0, x1, y1);

                let trace = sxx + syy;
                let spread = ((sxx - syy).powi(2) + 4.0 * sxy * sxy).sqrt();
                let min_eig = (trace - spread) / 2.0;
                if min_eig < self.config.min_eigenvalue {
                    continue;
                }

                let det = sxx * syy - sxy * sxy;
                let u = (-syy * sxt + sxy * syt) / det;
                let v = (sxy * sxt - sxx * syt) / det;
                let magnitude = (u * u + v * v).sqrt();
                if magnitude.is_finite() {
                    total += magnitude.min(self.config.max_magnitude);
                }
            }
        }

        total / (w * h) as f64
    }
}

impl MotionScorer for LucasKanadeScorer {
    fn score(&self, previous: Option<&RawFrame>, current: &RawFrame) -> Result<f64, MotionError> {
        let Some(previous) = previous else {
            return Ok(0.0);
        };

        let (width, height) = self.target_dims(current);
        let prev = self.downscale(previous, width, height)?;
        let curr = self.downscale(current, width, height)?;

        let score = self.mean_flow(&prev, &curr);
        trace!(frame = current.sequence, score, "motion scored");
        Ok(score)
    }
}

/// Integral image for O(1) rectangle sums
struct SummedArea {
    table: Vec<f64>,
    stride: usize,
}

impl SummedArea {
    fn new(values: &[f64], w: usize, h: usize) -> Self {
        let stride = w + 1;
        let mut table = vec![0.0; stride * (h + 1)];
        for y in 0..h {
            let mut row = 0.0;
            for x in 0..w {
                row += values[y * w + x];
                table[(y + 1) * stride + x + 1] = table[y * stride + x + 1] + row;
            }
        }
        Self { table, stride }
    }

    /// Sum over [x0, x1) x [y0, y1)
    fn sum(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> f64 {
        let s = self.stride;
        self.table[y1 * s + x1] - self.table[y0 * s + x1] - self.table[y1 * s + x0]
            + self.table[y0 * s + x0]
    }
}
