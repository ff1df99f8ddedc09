//! Violence Watch runner
//!
//! Loads layered settings, builds the classifier and motion scorer, and
//! drives one detection run over a directory of frames.

pub mod settings;

pub use settings::Settings;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Context;
use inference_engine::{Classifier, MockClassifier};
use stream_driver::{RunReport, StreamDriver, TracingSink};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use video_source::{ImageDirSource, LucasKanadeScorer};

/// Initialize logging
pub fn init_logging(verbose: bool, json: bool) -> anyhow::Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    if json {
        let subscriber = FmtSubscriber::builder()
            .json()
            .with_max_level(level)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .context("Failed to set tracing subscriber")?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .context("Failed to set tracing subscriber")?;
    }
    Ok(())
}

/// Classifier for the configured model, or the brightness mock when no
/// model path is set
pub fn build_classifier(settings: &Settings) -> anyhow::Result<Box<dyn Classifier + Send>> {
    match &settings.model_path {
        Some(path) => load_model(path, settings),
        None => {
            warn!("No model path configured. Using mock implementation.");
            Ok(Box::new(MockClassifier::brightness()))
        }
    }
}

#[cfg(feature = "onnx")]
fn load_model(path: &Path, settings: &Settings) -> anyhow::Result<Box<dyn Classifier + Send>> {
    let classifier = inference_engine::OnnxClassifier::load(
        path,
        settings.detection.sequence_length,
        settings.detection.image_size as usize,
    )
    .with_context(|| format!("Failed to load model {}", path.display()))?;
    Ok(Box::new(classifier))
}

#[cfg(not(feature = "onnx"))]
fn load_model(path: &Path, _settings: &Settings) -> anyhow::Result<Box<dyn Classifier + Send>> {
    anyhow::bail!(
        "Model {} requested but ONNX support is not compiled in",
        path.display()
    )
}

/// Run detection over `input` (a directory of frames) and return the report
pub fn run_detection(
    settings: &Settings,
    input: &Path,
    stop: Arc<AtomicBool>,
) -> anyhow::Result<RunReport> {
    settings
        .detection
        .validate()
        .context("Invalid detection settings")?;

    let source = ImageDirSource::open(input, settings.fps)
        .with_context(|| format!("Failed to open {}", input.display()))?;
    let classifier = build_classifier(settings)?;
    let scorer = LucasKanadeScorer::new(settings.flow.clone());

    let driver = StreamDriver::new(settings.detection.clone(), classifier, scorer).with_stop_flag(stop);
    let outcome = driver
        .run(source, TracingSink::new(settings.progress_every))
        .context("Detection run failed")?;

    if let Some(path) = &settings.report_path {
        write_report(&outcome.report, path)?;
        info!("Report written to {}", path.display());
    }

    Ok(outcome.report)
}

/// Write the report as pretty JSON
pub fn write_report(report: &RunReport, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report).context("Failed to write report")?;
    Ok(())
}
