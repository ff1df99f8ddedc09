//! End-to-end runs of the detection pipeline with deterministic collaborators

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fusion::{FusionEngine, Verdict};
use proptest::prelude::*;
use inference_engine::MockClassifier;
use stream_driver::{
    DetectionConfig, FrameOutcome, NullSink, Progress, ReportSink, RunReport, StreamDriver,
    Termination,
};
use timeline::Timeline;
use video_source::{
    CaptureError, LucasKanadeScorer, MemorySource, MotionError, MotionScorer, RawFrame,
};

/// Motion equals a tenth of the current frame's blue channel
struct BlueMotion;

impl MotionScorer for BlueMotion {
    fn score(&self, previous: Option<&RawFrame>, current: &RawFrame) -> Result<f64, MotionError> {
        Ok(match previous {
            None => 0.0,
            Some(_) => current.data[2] as f64 / 10.0,
        })
    }
}

/// Probability equals the green channel of the newest frame
fn green_classifier() -> MockClassifier {
    MockClassifier::from_fn(|sequence| {
        sequence
            .last()
            .map(|f| f.tensor()[[1, 0, 0]] as f64)
            .unwrap_or(0.0)
    })
}

fn config(sequence_length: usize) -> DetectionConfig {
    DetectionConfig {
        sequence_length,
        image_size: 4,
        ..Default::default()
    }
}

/// Frames 4..=7 look violent (bright green, strong motion)
fn scripted_frames(count: u64) -> Vec<RawFrame> {
    (0..count)
        .map(|i| {
            if (4..=7).contains(&i) {
                RawFrame::filled(8, 8, [0, 250, 100], i)
            } else {
                RawFrame::filled(8, 8, [0, 25, 0], i)
            }
        })
        .collect()
}

#[derive(Default)]
struct RecordingSink {
    progress: Vec<Progress>,
    outcomes: Vec<FrameOutcome>,
    snapshots: Vec<Timeline>,
    finished: Option<RunReport>,
    stop_at: Option<(u64, Arc<AtomicBool>)>,
}

impl ReportSink for RecordingSink {
    fn on_progress(&mut self, progress: &Progress) {
        self.progress.push(*progress);
        if let Some((at, flag)) = &self.stop_at {
            if progress.frame_index == *at {
                flag.store(true, Ordering::Relaxed);
            }
        }
    }

    fn on_frame(&mut self, outcome: &FrameOutcome) {
        self.outcomes.push(outcome.clone());
    }

    fn on_snapshot(&mut self, timeline: &Timeline) {
        self.snapshots.push(timeline.clone());
    }

    fn on_finish(&mut self, _timeline: &Timeline, report: &RunReport) {
        self.finished = Some(report.clone());
    }
}

#[test]
fn test_scripted_stream_produces_one_event() {
    let driver = StreamDriver::new(config(2), green_classifier(), BlueMotion);
    let source = MemorySource::new(scripted_frames(10), 10.0);

    let outcome = driver.run(source, NullSink).unwrap();
    let timeline = &outcome.timeline;

    assert_eq!(timeline.len(), 9);
    let verdicts: Vec<Verdict> = timeline.records().iter().map(|r| r.verdict).collect();
    assert_eq!(&verdicts[..3], &[Verdict::Normal; 3]);
    assert_eq!(&verdicts[3..7], &[Verdict::Violence; 4]);
    assert_eq!(&verdicts[7..], &[Verdict::Normal; 2]);

    let intervals = timeline.violence_intervals();
    assert_eq!(intervals.len(), 1);
    assert_eq!((intervals[0].start, intervals[0].end), (0.5, 0.8));

    let report = &outcome.report;
    assert_eq!(report.termination, Termination::Exhausted);
    assert_eq!(report.frames.acquired, 10);
    assert_eq!(report.frames.buffering, 1);
    assert_eq!(report.frames.recorded, 9);
    assert_eq!(report.summary.intervals, intervals);
}

#[test]
fn test_high_motion_without_detection_stays_normal() {
    let frames: Vec<RawFrame> = (0..6).map(|i| RawFrame::filled(8, 8, [0, 25, 200], i)).collect();
    let driver = StreamDriver::new(config(2), green_classifier(), BlueMotion);

    let outcome = driver.run(MemorySource::new(frames, 10.0), NullSink).unwrap();
    assert!(outcome
        .timeline
        .records()
        .iter()
        .all(|r| r.verdict == Verdict::Normal));
}

#[test]
fn test_detection_without_motion_is_false_alarm() {
    let frames: Vec<RawFrame> = (0..6).map(|i| RawFrame::filled(8, 8, [0, 250, 0], i)).collect();
    let driver = StreamDriver::new(config(3), green_classifier(), BlueMotion);

    let outcome = driver.run(MemorySource::new(frames, 10.0), NullSink).unwrap();
    assert_eq!(outcome.timeline.len(), 4);
    assert_eq!(outcome.timeline.count(Verdict::FalseAlarm), 4);
    assert!(outcome.timeline.violence_intervals().is_empty());
}

#[test]
fn test_replay_is_deterministic() {
    let run = || {
        StreamDriver::new(config(3), green_classifier(), BlueMotion)
            .run(MemorySource::new(scripted_frames(20), 25.0), NullSink)
            .unwrap()
            .timeline
    };
    assert_eq!(run(), run());
}

#[test]
fn test_short_stream_never_records() {
    let driver = StreamDriver::new(config(16), MockClassifier::constant(0.99), BlueMotion);
    let outcome = driver
        .run(MemorySource::new(scripted_frames(15), 30.0), NullSink)
        .unwrap();

    assert!(outcome.timeline.is_empty());
    assert!(outcome.timeline.violence_intervals().is_empty());
    assert_eq!(outcome.report.frames.buffering, 15);
    assert!(outcome.report.summary.probability.is_none());
}

#[test]
fn test_decode_failure_skips_frame() {
    let mut items: Vec<Result<RawFrame, CaptureError>> =
        scripted_frames(4).into_iter().map(Ok).collect();
    items.insert(
        2,
        Err(CaptureError::Decode {
            index: 2,
            reason: "corrupt".into(),
        }),
    );

    let mut sink = RecordingSink::default();
    let driver = StreamDriver::new(config(2), green_classifier(), BlueMotion);
    let outcome = driver
        .run(MemorySource::with_results(items, 10.0), &mut sink)
        .unwrap();

    assert_eq!(outcome.report.termination, Termination::Exhausted);
    assert_eq!(outcome.report.frames.acquired, 5);
    assert_eq!(outcome.report.frames.skipped, 1);
    assert_eq!(outcome.timeline.len(), 3);
    // Skipped frame still advances stream time
    let stamps: Vec<f64> = outcome.timeline.records().iter().map(|r| r.timestamp).collect();
    assert_eq!(stamps, vec![0.2, 0.4, 0.5]);
    assert!(matches!(sink.outcomes[2], FrameOutcome::Skipped { .. }));
}

#[test]
fn test_read_failure_ends_stream_cleanly() {
    let mut items: Vec<Result<RawFrame, CaptureError>> =
        scripted_frames(8).into_iter().map(Ok).collect();
    items.insert(5, Err(CaptureError::Read("device unplugged".into())));

    let driver = StreamDriver::new(config(2), green_classifier(), BlueMotion);
    let outcome = driver
        .run(MemorySource::with_results(items, 10.0), NullSink)
        .unwrap();

    assert!(matches!(outcome.report.termination, Termination::SourceFailed(_)));
    assert_eq!(outcome.report.frames.acquired, 5);
    assert_eq!(outcome.timeline.len(), 4);
}

#[test]
fn test_snapshots_follow_cadence() {
    let frames: Vec<RawFrame> = (0..120).map(|i| RawFrame::filled(8, 8, [0, 25, 0], i)).collect();
    let mut sink = RecordingSink::default();
    let driver = StreamDriver::new(config(4), green_classifier(), BlueMotion);

    let outcome = driver.run(MemorySource::new(frames, 30.0), &mut sink).unwrap();

    // Frames 50 and 100; records start at frame 4
    assert_eq!(sink.snapshots.len(), 2);
    assert_eq!(sink.snapshots[0].len(), 47);
    assert_eq!(sink.snapshots[1].len(), 97);
    assert_eq!(outcome.timeline.len(), 117);

    assert_eq!(sink.progress.len(), 120);
    assert_eq!(sink.progress[119].total_frames, Some(120));
    assert_eq!(sink.progress[119].fraction(), Some(1.0));
    assert!(sink.finished.is_some());
}

#[test]
fn test_no_snapshot_for_small_timeline() {
    let frames: Vec<RawFrame> = (0..50).map(|i| RawFrame::filled(8, 8, [0, 25, 0], i)).collect();
    let mut sink = RecordingSink::default();
    // Buffer fills at frame 45, leaving 6 records at frame 50
    let driver = StreamDriver::new(config(45), green_classifier(), BlueMotion);

    driver.run(MemorySource::new(frames, 30.0), &mut sink).unwrap();
    assert!(sink.snapshots.is_empty());
}

#[test]
fn test_stop_between_frames_keeps_partial_timeline() {
    let stop = Arc::new(AtomicBool::new(false));
    let mut sink = RecordingSink {
        stop_at: Some((6, stop.clone())),
        ..Default::default()
    };
    let driver = StreamDriver::new(config(2), green_classifier(), BlueMotion).with_stop_flag(stop);

    let outcome = driver
        .run(MemorySource::new(scripted_frames(10), 10.0), &mut sink)
        .unwrap();

    assert_eq!(outcome.report.termination, Termination::Stopped);
    assert_eq!(outcome.report.frames.acquired, 6);
    assert_eq!(outcome.timeline.len(), 5);
}

#[test]
fn test_unknown_fps_uses_fallback() {
    let driver = StreamDriver::new(config(1), MockClassifier::constant(0.1), BlueMotion);
    let outcome = driver
        .run(MemorySource::new(scripted_frames(30), 0.0), NullSink)
        .unwrap();

    let last = outcome.timeline.last().unwrap();
    assert!((last.timestamp - 1.0).abs() < 1e-12);
}

#[test]
fn test_optical_flow_scorer_end_to_end() {
    let frames: Vec<RawFrame> = (0..8)
        .map(|i| {
            let mut data = Vec::with_capacity(32 * 24 * 3);
            for y in 0..24u32 {
                for x in 0..32u32 {
                    let v = 128.0 + 60.0 * ((x as f64 + i as f64) * 0.4).sin() + 40.0 * (y as f64 * 0.3).cos();
                    let v = v.clamp(0.0, 255.0) as u8;
                    data.extend_from_slice(&[v, v, v]);
                }
            }
            RawFrame::new(data, 32, 24, i)
        })
        .collect();

    let driver = StreamDriver::new(config(4), MockClassifier::brightness(), LucasKanadeScorer::default());
    let outcome = driver.run(MemorySource::new(frames, 30.0), NullSink).unwrap();

    assert_eq!(outcome.timeline.len(), 5);
    assert!(outcome.timeline.records().iter().all(|r| r.avg_motion > 0.0));
    assert!(outcome
        .timeline
        .records()
        .iter()
        .all(|r| (0.0..=1.0).contains(&r.probability)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_records_follow_buffer_fill_and_fusion(
        shades in proptest::collection::vec((any::<u8>(), any::<u8>()), 0..40),
        sequence_length in 1usize..8,
    ) {
        let frames: Vec<RawFrame> = shades
            .iter()
            .enumerate()
            .map(|(i, &(g, b))| RawFrame::filled(8, 8, [0, g, b], i as u64))
            .collect();
        let config = config(sequence_length);
        let fusion = FusionEngine::new(config.fusion());

        let driver = StreamDriver::new(config, green_classifier(), BlueMotion);
        let outcome = driver.run(MemorySource::new(frames, 10.0), NullSink).unwrap();

        let records = outcome.timeline.records();
        prop_assert_eq!(records.len(), shades.len().saturating_sub(sequence_length - 1));
        for pair in records.windows(2) {
            prop_assert!(pair[0].timestamp < pair[1].timestamp);
        }
        for record in records {
            prop_assert!((0.0..=1.0).contains(&record.probability));
            prop_assert!(record.avg_motion >= 0.0);
            prop_assert_eq!(record.verdict, fusion.decide(record.probability, record.avg_motion));
        }
    }
}
