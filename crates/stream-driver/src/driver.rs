//! Per-stream pipeline driver

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use frame_window::{MotionWindow, SequenceBuffer};
use fusion::{FrameStatus, FusionEngine, Verdict};
use inference_engine::Classifier;
use timeline::{Timeline, TimelineRecord};
use tracing::{debug, info, warn};
use video_source::{preprocess, FrameError, FrameSource, MotionScorer, PreprocessedFrame, RawFrame};

use crate::{
    DetectionConfig, FrameCounters, PipelineError, Progress, ReportSink, RunOutcome, RunReport,
    Termination,
};

/// Why a frame contributed nothing to the sequence buffer or timeline
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Source could not decode the frame
    Decode(String),
    /// Frame buffer did not match its dimensions, or preprocessing failed
    Malformed(FrameError),
}

/// Result of advancing the pipeline by one frame
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Sequence buffer not yet full; no probability exists for this frame
    Buffering { timestamp: f64, avg_motion: f64 },
    /// Fused and appended to the timeline
    Recorded(TimelineRecord),
    /// Dropped; the stream continues
    Skipped { timestamp: f64, reason: SkipReason },
}

impl FrameOutcome {
    pub fn timestamp(&self) -> f64 {
        match self {
            FrameOutcome::Buffering { timestamp, .. } => *timestamp,
            FrameOutcome::Recorded(record) => record.timestamp,
            FrameOutcome::Skipped { timestamp, .. } => *timestamp,
        }
    }

    /// Pipeline state for frames that went through fusion or buffering
    pub fn status(&self) -> Option<FrameStatus> {
        match self {
            FrameOutcome::Buffering { .. } => Some(FrameStatus::Buffering),
            FrameOutcome::Recorded(record) => Some(FrameStatus::Judged(record.verdict)),
            FrameOutcome::Skipped { .. } => None,
        }
    }

    /// Per-outcome frame counter. Recorded frames are counted by verdict
    /// in `verdicts_total`.
    pub fn counter_name(&self) -> Option<&'static str> {
        match self {
            FrameOutcome::Buffering { .. } => Some("frames_buffering_total"),
            FrameOutcome::Skipped { .. } => Some("frames_skipped_total"),
            FrameOutcome::Recorded(_) => None,
        }
    }

    /// Overlay caption
    pub fn caption(&self) -> String {
        match self {
            FrameOutcome::Buffering { avg_motion, .. } => {
                FrameStatus::Buffering.caption(0.0, *avg_motion)
            }
            FrameOutcome::Recorded(record) => {
                record.verdict.caption(record.probability, record.avg_motion)
            }
            FrameOutcome::Skipped { .. } => "Skipped".to_string(),
        }
    }
}

/// Owns all per-run state: the two windows, the timeline and the previous
/// raw frame. One driver processes exactly one stream.
pub struct StreamDriver<C, M> {
    config: DetectionConfig,
    classifier: C,
    scorer: M,
    fusion: FusionEngine,
    sequence: SequenceBuffer<PreprocessedFrame>,
    motion: MotionWindow,
    timeline: Timeline,
    previous: Option<RawFrame>,
    last_verdict: Option<Verdict>,
    stop: Option<Arc<AtomicBool>>,
}

impl<C: Classifier, M: MotionScorer> StreamDriver<C, M> {
    pub fn new(config: DetectionConfig, classifier: C, scorer: M) -> Self {
        Self {
            fusion: FusionEngine::new(config.fusion()),
            sequence: SequenceBuffer::new(config.sequence_length),
            motion: MotionWindow::new(config.sequence_length),
            timeline: Timeline::new(),
            previous: None,
            last_verdict: None,
            stop: None,
            classifier,
            scorer,
            config,
        }
    }

    /// Flag checked before each frame is acquired; setting it ends the run
    /// with the timeline gathered so far
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Read-only view of the timeline so far
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Advance the pipeline by one decoded frame.
    ///
    /// A frame whose buffer does not match its dimensions is skipped before
    /// motion scoring and does not become the previous frame. A frame that
    /// fails preprocessing still contributes its motion score.
    pub fn process_frame(&mut self, frame: RawFrame, timestamp: f64) -> Result<FrameOutcome, PipelineError> {
        if let Err(e) = frame.validate() {
            warn!(frame = frame.sequence, "Skipping malformed frame: {}", e);
            return Ok(FrameOutcome::Skipped {
                timestamp,
                reason: SkipReason::Malformed(e),
            });
        }

        let magnitude = self.scorer.score(self.previous.as_ref(), &frame)?;
        self.motion.push(magnitude);
        let avg_motion = self.motion.average();
        metrics::gauge!("avg_motion").set(avg_motion);

        let processed = preprocess(&frame, self.config.image_size);
        self.previous = Some(frame);
        let processed = match processed {
            Ok(p) => p,
            Err(e) => {
                warn!("Skipping frame at {:.2}s: preprocessing failed: {}", timestamp, e);
                return Ok(FrameOutcome::Skipped {
                    timestamp,
                    reason: SkipReason::Malformed(e),
                });
            }
        };
        self.sequence.push(processed);

        let Some(sequence) = self.sequence.snapshot() else {
            return Ok(FrameOutcome::Buffering { timestamp, avg_motion });
        };

        let probability = self.classifier.classify(&sequence)?;
        let verdict = self.fusion.decide(probability, avg_motion);
        self.note_transition(verdict, timestamp, probability, avg_motion);

        let record = TimelineRecord {
            timestamp,
            probability,
            avg_motion,
            verdict,
        };
        self.timeline.append(record);
        metrics::counter!("verdicts_total", "verdict" => verdict.as_str()).increment(1);

        Ok(FrameOutcome::Recorded(record))
    }

    fn note_transition(&mut self, verdict: Verdict, timestamp: f64, probability: f64, avg_motion: f64) {
        let was_violent = self.last_verdict == Some(Verdict::Violence);
        match (was_violent, verdict) {
            (false, Verdict::Violence) => info!(
                "Violence onset at {:.1}s (probability {:.2}, motion {:.2})",
                timestamp, probability, avg_motion
            ),
            (true, Verdict::FalseAlarm | Verdict::Normal) => {
                info!("Violence cleared at {:.1}s ({})", timestamp, verdict)
            }
            _ => {}
        }
        self.last_verdict = Some(verdict);
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    /// Process the whole stream. Source failures end the run cleanly with
    /// whatever was recorded; classifier and motion failures are returned.
    pub fn run<S, R>(mut self, mut source: S, mut sink: R) -> Result<RunOutcome, PipelineError>
    where
        S: FrameSource,
        R: ReportSink,
    {
        let metadata = source.metadata();
        let started_at = Utc::now();
        let clock = Instant::now();
        let mut counters = FrameCounters::default();
        let mut frame_index = 0u64;

        info!(
            fps = metadata.fps,
            total_frames = ?metadata.total_frames,
            sequence_length = self.config.sequence_length,
            confidence_threshold = self.config.confidence_threshold,
            motion_threshold = self.config.motion_threshold,
            "Starting detection run"
        );

        let termination = loop {
            if self.stop_requested() {
                info!("Stop requested after {} frames", frame_index);
                break Termination::Stopped;
            }
            let Some(next) = source.next_frame() else {
                break Termination::Exhausted;
            };

            frame_index += 1;
            let timestamp = metadata.timestamp(frame_index, self.config.fallback_fps);

            let outcome = match next {
                Ok(frame) => self.process_frame(frame, timestamp)?,
                Err(e) if e.is_recoverable() => {
                    warn!("Skipping undecodable frame {}: {}", frame_index, e);
                    FrameOutcome::Skipped {
                        timestamp,
                        reason: SkipReason::Decode(e.to_string()),
                    }
                }
                Err(e) => {
                    warn!("Frame source failed, ending stream: {}", e);
                    break Termination::SourceFailed(e.to_string());
                }
            };

            counters.observe(&outcome);
            metrics::counter!("frames_acquired_total").increment(1);
            if let Some(name) = outcome.counter_name() {
                metrics::counter!(name).increment(1);
            }

            sink.on_progress(&Progress {
                frame_index,
                total_frames: metadata.total_frames,
                timestamp,
                elapsed_seconds: clock.elapsed().as_secs_f64(),
            });
            sink.on_frame(&outcome);

            let skipped = matches!(outcome, FrameOutcome::Skipped { .. });
            if !skipped
                && frame_index % self.config.snapshot_interval.max(1) == 0
                && self.timeline.len() > self.config.min_snapshot_records
            {
                debug!(records = self.timeline.len(), "Emitting timeline snapshot");
                sink.on_snapshot(&self.timeline);
            }
        };

        let report = RunReport::build(
            started_at,
            &self.config,
            metadata,
            counters,
            termination,
            clock.elapsed().as_secs_f64(),
            &self.timeline,
        );
        sink.on_finish(&self.timeline, &report);

        Ok(RunOutcome {
            timeline: self.timeline,
            report,
        })
    }
}
