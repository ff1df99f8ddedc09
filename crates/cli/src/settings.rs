//! Layered runner settings
//!
//! Precedence, lowest first: built-in defaults, optional TOML file,
//! `VWATCH_*` environment variables (nested keys joined with `__`,
//! e.g. `VWATCH_DETECTION__MOTION_THRESHOLD=1.5`), then command-line flags.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use stream_driver::DetectionConfig;
use video_source::FlowConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub detection: DetectionConfig,

    pub flow: FlowConfig,

    /// ONNX sequence model; the mock classifier is used when unset
    pub model_path: Option<PathBuf>,

    /// Frame rate of the input sequence
    pub fps: f64,

    /// Where to write the JSON report
    pub report_path: Option<PathBuf>,

    /// Log progress every this many frames
    pub progress_every: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            flow: FlowConfig::default(),
            model_path: None,
            fps: 30.0,
            report_path: None,
            progress_every: 100,
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional file and the environment
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);

        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }

        builder
            .add_source(
                Environment::with_prefix("VWATCH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip_through_config() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.detection, DetectionConfig::default());
        assert_eq!(settings.fps, 30.0);
        assert!(settings.model_path.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watch.toml");
        std::fs::write(
            &path,
            "fps = 25.0\n[detection]\nmotion_threshold = 1.5\nsequence_length = 8\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.fps, 25.0);
        assert_eq!(settings.detection.motion_threshold, 1.5);
        assert_eq!(settings.detection.sequence_length, 8);
        // Untouched keys keep their defaults
        assert_eq!(settings.detection.confidence_threshold, 0.85);
    }
}
