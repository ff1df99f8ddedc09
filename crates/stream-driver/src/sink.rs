//! Reporting sinks
//!
//! Sinks only ever see shared references to pipeline state, so nothing they
//! do can feed back into detection.

use timeline::{SeriesField, Timeline};
use tracing::{debug, info};

use crate::{FrameOutcome, RunReport};

/// Per-frame progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// 1-based index of the frame just handled
    pub frame_index: u64,
    pub total_frames: Option<u64>,
    /// Stream time of the frame
    pub timestamp: f64,
    /// Wall-clock seconds since the run started
    pub elapsed_seconds: f64,
}

impl Progress {
    pub fn fraction(&self) -> Option<f64> {
        match self.total_frames {
            Some(total) if total > 0 => Some((self.frame_index as f64 / total as f64).min(1.0)),
            _ => None,
        }
    }
}

/// Consumer of pipeline output. Every hook is advisory and must not block
/// for long; the default implementations do nothing.
pub trait ReportSink {
    fn on_progress(&mut self, _progress: &Progress) {}

    fn on_frame(&mut self, _outcome: &FrameOutcome) {}

    /// Periodic view of the timeline so far
    fn on_snapshot(&mut self, _timeline: &Timeline) {}

    fn on_finish(&mut self, _timeline: &Timeline, _report: &RunReport) {}
}

impl<R: ReportSink + ?Sized> ReportSink for &mut R {
    fn on_progress(&mut self, progress: &Progress) {
        (**self).on_progress(progress)
    }

    fn on_frame(&mut self, outcome: &FrameOutcome) {
        (**self).on_frame(outcome)
    }

    fn on_snapshot(&mut self, timeline: &Timeline) {
        (**self).on_snapshot(timeline)
    }

    fn on_finish(&mut self, timeline: &Timeline, report: &RunReport) {
        (**self).on_finish(timeline, report)
    }
}

/// Discards everything
#[derive(Debug, Default)]
pub struct NullSink;

impl ReportSink for NullSink {}

/// Logs progress, snapshots and the final summary through `tracing`
#[derive(Debug)]
pub struct TracingSink {
    /// Log progress every this many frames
    progress_every: u64,
}

impl TracingSink {
    pub fn new(progress_every: u64) -> Self {
        Self {
            progress_every: progress_every.max(1),
        }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(100)
    }
}

impl ReportSink for TracingSink {
    fn on_progress(&mut self, progress: &Progress) {
        if progress.frame_index % self.progress_every != 0 {
            return;
        }
        match (progress.total_frames, progress.fraction()) {
            (Some(total), Some(fraction)) => info!(
                "Processing frame {}/{} ({:.0}%) - time {:.1}s",
                progress.frame_index,
                total,
                fraction * 100.0,
                progress.timestamp
            ),
            _ => info!(
                "Processing frame {} - time {:.1}s",
                progress.frame_index, progress.timestamp
            ),
        }
    }

    fn on_frame(&mut self, outcome: &FrameOutcome) {
        debug!(timestamp = outcome.timestamp(), "{}", outcome.caption());
    }

    fn on_snapshot(&mut self, timeline: &Timeline) {
        let probability = timeline
            .descriptive_stats(SeriesField::Probability)
            .map(|s| s.mean)
            .unwrap_or(0.0);
        let motion = timeline
            .descriptive_stats(SeriesField::Motion)
            .map(|s| s.mean)
            .unwrap_or(0.0);
        info!(
            records = timeline.len(),
            events = timeline.violence_intervals().len(),
            "Timeline snapshot: mean probability {:.3}, mean motion {:.2}",
            probability,
            motion
        );
    }

    fn on_finish(&mut self, _timeline: &Timeline, report: &RunReport) {
        let summary = &report.summary;
        info!(
            run_id = %report.run_id,
            "Run finished ({:?}): {} frames, {} recorded, {} skipped in {:.1}s",
            report.termination,
            report.frames.acquired,
            report.frames.recorded,
            report.frames.skipped,
            report.processing_seconds
        );
        for share in &summary.shares {
            info!("  {}: {} ({:.1}%)", share.verdict, share.count, share.percent);
        }
        if summary.intervals.is_empty() {
            info!("No violence events detected");
        }
        for (i, interval) in summary.intervals.iter().enumerate() {
            info!(
                "Violence event #{}: {:.1}s - {:.1}s (duration {:.1}s)",
                i + 1,
                interval.start,
                interval.end,
                interval.duration
            );
        }
    }
}
