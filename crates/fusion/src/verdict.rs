//! Verdict types

use serde::{Deserialize, Serialize};

/// Outcome of fusion for a fully buffered frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// Classifier detection corroborated by high motion
    #[serde(rename = "VIOLENCE")]
    Violence,
    /// Classifier detection without enough motion
    #[serde(rename = "FALSE ALARM")]
    FalseAlarm,
    #[serde(rename = "Normal")]
    Normal,
}

impl Verdict {
    pub const ALL: [Verdict; 3] = [Verdict::Violence, Verdict::FalseAlarm, Verdict::Normal];

    /// Report label
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Violence => "VIOLENCE",
            Verdict::FalseAlarm => "FALSE ALARM",
            Verdict::Normal => "Normal",
        }
    }

    /// Overlay caption for a frame with this verdict
    pub fn caption(&self, probability: f64, avg_motion: f64) -> String {
        match self {
            Verdict::Violence => format!(
                "VIOLENCE! ({:.0}% | M:{:.1})",
                probability * 100.0,
                avg_motion
            ),
            Verdict::FalseAlarm => format!("FALSE ALARM (M:{:.1})", avg_motion),
            Verdict::Normal => format!("Normal (Conf:{:.0}%)", probability * 100.0),
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-frame pipeline state. Frames seen before the sequence buffer first
/// fills are `Buffering` and never reach the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameStatus {
    Buffering,
    Judged(Verdict),
}

impl FrameStatus {
    pub fn verdict(&self) -> Option<Verdict> {
        match self {
            FrameStatus::Buffering => None,
            FrameStatus::Judged(v) => Some(*v),
        }
    }

    pub fn caption(&self, probability: f64, avg_motion: f64) -> String {
        match self {
            FrameStatus::Buffering => "Initializing...".to_string(),
            FrameStatus::Judged(v) => v.caption(probability, avg_motion),
        }
    }
}
