//! Frame sources

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{CaptureError, RawFrame};

/// Image extensions picked up by `ImageDirSource`
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Stream-level information reported by a source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamMetadata {
    /// Nominal frame rate; may be 0 or negative when unknown
    pub fps: f64,
    /// Total frame count, if known up front
    pub total_frames: Option<u64>,
}

impl StreamMetadata {
    /// Frame rate to use for timestamps
    pub fn effective_fps(&self, fallback_fps: f64) -> f64 {
        if self.fps > 0.0 {
            self.fps
        } else {
            fallback_fps
        }
    }

    /// Seconds from stream start for a 1-based frame index
    pub fn timestamp(&self, frame_index: u64, fallback_fps: f64) -> f64 {
        frame_index as f64 / self.effective_fps(fallback_fps)
    }
}

/// A finite, non-restartable sequence of raw frames.
///
/// `None` means the stream is exhausted. A recoverable error
/// (see `CaptureError::is_recoverable`) loses only that frame.
pub trait FrameSource {
    fn metadata(&self) -> StreamMetadata;

    fn next_frame(&mut self) -> Option<Result<RawFrame, CaptureError>>;
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn metadata(&self) -> StreamMetadata {
        (**self).metadata()
    }

    fn next_frame(&mut self) -> Option<Result<RawFrame, CaptureError>> {
        (**self).next_frame()
    }
}

/// Source over frames already in memory
pub struct MemorySource {
    items: std::vec::IntoIter<Result<RawFrame, CaptureError>>,
    metadata: StreamMetadata,
}

impl MemorySource {
    pub fn new(frames: Vec<RawFrame>, fps: f64) -> Self {
        Self::with_results(frames.into_iter().map(Ok).collect(), fps)
    }

    /// Source that may also yield errors at chosen positions
    pub fn with_results(items: Vec<Result<RawFrame, CaptureError>>, fps: f64) -> Self {
        let metadata = StreamMetadata {
            fps,
            total_frames: Some(items.len() as u64),
        };
        Self {
            items: items.into_iter(),
            metadata,
        }
    }
}

impl FrameSource for MemorySource {
    fn metadata(&self) -> StreamMetadata {
        self.metadata
    }

    fn next_frame(&mut self) -> Option<Result<RawFrame, CaptureError>> {
        self.items.next()
    }
}

/// Source over a directory of still images, read in file-name order
pub struct ImageDirSource {
    paths: std::vec::IntoIter<PathBuf>,
    metadata: StreamMetadata,
    index: u64,
}

impl ImageDirSource {
    pub fn open(dir: impl AsRef<Path>, fps: f64) -> Result<Self, CaptureError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(CaptureError::Open(format!("{} is not a directory", dir.display())));
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if is_image {
                paths.push(path);
            }
        }
        paths.sort();

        info!("Opened image sequence {} ({} frames)", dir.display(), paths.len());

        Ok(Self {
            metadata: StreamMetadata {
                fps,
                total_frames: Some(paths.len() as u64),
            },
            paths: paths.into_iter(),
            index: 0,
        })
    }
}

impl FrameSource for ImageDirSource {
    fn metadata(&self) -> StreamMetadata {
        self.metadata
    }

    fn next_frame(&mut self) -> Option<Result<RawFrame, CaptureError>> {
        let path = self.paths.next()?;
        let index = self.index;
        self.index += 1;

        debug!("Reading frame {} from {}", index, path.display());

        let result = match image::open(&path) {
            Ok(img) => {
                let rgb = img.to_rgb8();
                let (width, height) = rgb.dimensions();
                Ok(RawFrame::new(rgb.into_raw(), width, height, index))
            }
            Err(image::ImageError::IoError(e)) => {
                Err(CaptureError::Read(format!("{}: {}", path.display(), e)))
            }
            Err(e) => Err(CaptureError::Decode {
                index,
                reason: format!("{}: {}", path.display(), e),
            }),
        };
        Some(result)
    }
}
