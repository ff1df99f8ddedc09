//! Detection configuration

use fusion::FusionConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Out-of-range configuration values
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} value {value} is out of range ({range})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        range: &'static str,
    },
}

/// Settings for one run; constant while the stream is processed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Classifier probability threshold, in (0, 1)
    pub confidence_threshold: f64,

    /// Frames per classifier input sequence
    pub sequence_length: usize,

    /// Side length of preprocessed frames
    pub image_size: u32,

    /// Average motion threshold
    pub motion_threshold: f64,

    /// Requested rolling-average window for reporting
    pub rolling_window_size: usize,

    /// Emit a timeline snapshot every this many frames
    pub snapshot_interval: u64,

    /// Snapshots need more records than this
    pub min_snapshot_records: usize,

    /// Frame rate assumed when the source reports none
    pub fallback_fps: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.85,
            sequence_length: 16,
            image_size: 64,
            motion_threshold: 2.0,
            rolling_window_size: 200,
            snapshot_interval: 50,
            min_snapshot_records: 10,
            fallback_fps: 30.0,
        }
    }
}

impl DetectionConfig {
    /// Lower thresholds: more detections, more false alarms
    pub fn strict() -> Self {
        Self {
            confidence_threshold: 0.7,
            motion_threshold: 1.0,
            ..Default::default()
        }
    }

    /// Higher thresholds: fewer detections
    pub fn lenient() -> Self {
        Self {
            confidence_threshold: 0.95,
            motion_threshold: 3.5,
            ..Default::default()
        }
    }

    pub fn fusion(&self) -> FusionConfig {
        FusionConfig {
            confidence_threshold: self.confidence_threshold,
            motion_threshold: self.motion_threshold,
        }
    }

    /// Range checks for externally supplied values. The driver itself
    /// does not call this.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.confidence_threshold > 0.0 && self.confidence_threshold < 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "confidence_threshold",
                value: self.confidence_threshold,
                range: "0 < x < 1",
            });
        }
        if self.sequence_length == 0 {
            return Err(ConfigError::OutOfRange {
                field: "sequence_length",
                value: 0.0,
                range: "x > 0",
            });
        }
        if self.image_size == 0 {
            return Err(ConfigError::OutOfRange {
                field: "image_size",
                value: 0.0,
                range: "x > 0",
            });
        }
        if !(self.motion_threshold >= 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "motion_threshold",
                value: self.motion_threshold,
                range: "x >= 0",
            });
        }
        if self.rolling_window_size == 0 {
            return Err(ConfigError::OutOfRange {
                field: "rolling_window_size",
                value: 0.0,
                range: "x > 0",
            });
        }
        if self.snapshot_interval == 0 {
            return Err(ConfigError::OutOfRange {
                field: "snapshot_interval",
                value: 0.0,
                range: "x > 0",
            });
        }
        Ok(())
    }
}
