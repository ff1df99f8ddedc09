//! Violence Watch - Main Entry Point

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cli::{init_logging, run_detection, Settings};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "violence-watch", version, about = "Detect sustained violence in a frame sequence")]
struct Args {
    /// Directory of frames (png/jpg/bmp), processed in file-name order
    input: PathBuf,

    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// ONNX sequence model
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Frame rate of the input sequence
    #[arg(long)]
    fps: Option<f64>,

    /// Write the JSON report here
    #[arg(short, long)]
    report: Option<PathBuf>,

    #[arg(long)]
    confidence_threshold: Option<f64>,

    #[arg(long)]
    motion_threshold: Option<f64>,

    #[arg(long)]
    sequence_length: Option<usize>,

    #[arg(long)]
    image_size: Option<u32>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long)]
    log_json: bool,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(model) = &self.model {
            settings.model_path = Some(model.clone());
        }
        if let Some(fps) = self.fps {
            settings.fps = fps;
        }
        if let Some(report) = &self.report {
            settings.report_path = Some(report.clone());
        }
        if let Some(v) = self.confidence_threshold {
            settings.detection.confidence_threshold = v;
        }
        if let Some(v) = self.motion_threshold {
            settings.detection.motion_threshold = v;
        }
        if let Some(v) = self.sequence_length {
            settings.detection.sequence_length = v;
        }
        if let Some(v) = self.image_size {
            settings.detection.image_size = v;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.log_json)?;

    info!("=== Violence Watch v{} ===", env!("CARGO_PKG_VERSION"));

    let mut settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;
    args.apply(&mut settings);

    // Ctrl-C stops the run between frames; partial results are still reported
    let stop = Arc::new(AtomicBool::new(false));
    let signal_flag = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current frame");
            signal_flag.store(true, Ordering::Relaxed);
        }
    });

    let input = args.input.clone();
    let report = tokio::task::spawn_blocking(move || run_detection(&settings, &input, stop))
        .await
        .context("Detection task panicked")??;

    println!("{}", serde_json::to_string_pretty(&report.summary)?);
    Ok(())
}
