//! Decision Fusion
//!
//! Combines two independent signals per frame:
//! - the classifier's violence probability
//! - the smoothed optical-flow motion score
//!
//! Motion only corroborates the classifier. High motion alone never
//! raises a verdict above `Normal`.

mod verdict;

pub use verdict::{FrameStatus, Verdict};

use serde::{Deserialize, Serialize};

/// Fusion thresholds, constant for a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Classifier probability must exceed this to count as a detection
    pub confidence_threshold: f64,
    /// Average motion must exceed this to corroborate a detection
    pub motion_threshold: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.85,
            motion_threshold: 2.0,
        }
    }
}

/// Per-frame fusion of (probability, avg motion) into a verdict
#[derive(Debug, Clone)]
pub struct FusionEngine {
    config: FusionConfig,
}

impl FusionEngine {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Classifier alone says violence
    pub fn ai_detects(&self, probability: f64) -> bool {
        probability > self.config.confidence_threshold
    }

    /// Motion is high enough to corroborate
    pub fn motion_high(&self, avg_motion: f64) -> bool {
        avg_motion > self.config.motion_threshold
    }

    /// Decision table:
    ///
    /// | ai detect | motion high | verdict    |
    /// |-----------|-------------|------------|
    /// | yes       | yes         | Violence   |
    /// | yes       | no          | FalseAlarm |
    /// | no        | any         | Normal     |
    pub fn decide(&self, probability: f64, avg_motion: f64) -> Verdict {
        match (self.ai_detects(probability), self.motion_high(avg_motion)) {
            (true, true) => Verdict::Violence,
            (true, false) => Verdict::FalseAlarm,
            (false, _) => Verdict::Normal,
        }
    }
}

impl Default for FusionEngine {
    fn default() -> Self {
        Self::new(FusionConfig::default())
    }
}
