//! Run reporting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use timeline::{Timeline, TimelineSummary};
use uuid::Uuid;
use video_source::StreamMetadata;

use crate::{DetectionConfig, FrameOutcome};

/// How the stream ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Termination {
    /// Source ran out of frames
    Exhausted,
    /// Source reported an unrecoverable read failure
    SourceFailed(String),
    /// Stop was requested between frames
    Stopped,
}

/// Per-run frame accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameCounters {
    /// Frames taken from the source, including skipped ones
    pub acquired: u64,
    pub skipped: u64,
    pub buffering: u64,
    /// Frames that produced a timeline record
    pub recorded: u64,
}

impl FrameCounters {
    pub(crate) fn observe(&mut self, outcome: &FrameOutcome) {
        self.acquired += 1;
        match outcome {
            FrameOutcome::Skipped { .. } => self.skipped += 1,
            FrameOutcome::Buffering { .. } => self.buffering += 1,
            FrameOutcome::Recorded(_) => self.recorded += 1,
        }
    }
}

/// Final report handed to the sink and written by the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub config: DetectionConfig,
    pub stream: StreamMetadata,
    pub frames: FrameCounters,
    pub termination: Termination,
    /// Wall-clock processing time
    pub processing_seconds: f64,
    /// Frames acquired per wall-clock second
    pub processing_fps: f64,
    pub summary: TimelineSummary,
}

impl RunReport {
    pub(crate) fn build(
        started_at: DateTime<Utc>,
        config: &DetectionConfig,
        stream: StreamMetadata,
        frames: FrameCounters,
        termination: Termination,
        processing_seconds: f64,
        timeline: &Timeline,
    ) -> Self {
        let processing_fps = if processing_seconds > 0.0 {
            frames.acquired as f64 / processing_seconds
        } else {
            0.0
        };
        Self {
            run_id: Uuid::new_v4(),
            started_at,
            config: config.clone(),
            stream,
            frames,
            termination,
            processing_seconds,
            processing_fps,
            summary: TimelineSummary::from_timeline(timeline, config.rolling_window_size),
        }
    }
}

/// What a completed run hands back: the full timeline and its report
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub timeline: Timeline,
    pub report: RunReport,
}
