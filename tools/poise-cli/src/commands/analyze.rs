//! Analyze a recording.

use std::path::PathBuf;

use poise_analysis_core::{
    AnalysisOrchestrator, LandmarkProvider, OrchestratorConfig, ReplayLandmarks,
};
use poise_analysis_model::{AnalysisOutcome, AnalysisStatus};
use poise_common::config::AppConfig;
use poise_history::{record_outcome, JsonlHistory};
use poise_media::{FfmpegFrameSource, VideoHandle};

pub struct AnalyzeArgs {
    pub video: PathBuf,
    pub step: Option<f64>,
    pub metadata_timeout: Option<f64>,
    pub landmarks: Option<PathBuf>,
    pub no_landmarks: bool,
    pub json: bool,
    pub no_history: bool,
    pub history: Option<PathBuf>,
    pub max_width: Option<u32>,
}

pub async fn run(args: AnalyzeArgs, config: AppConfig) -> anyhow::Result<()> {
    let mut analysis = config.analysis.clone();
    if let Some(step) = args.step {
        if !step.is_finite() || step <= 0.0 {
            anyhow::bail!("--step must be a positive number of seconds, got {step}");
        }
        analysis.sample_step_secs = step;
    }
    if let Some(timeout) = args.metadata_timeout {
        if !timeout.is_finite() || timeout <= 0.0 {
            anyhow::bail!(
                "--metadata-timeout must be a positive number of seconds, got {timeout}"
            );
        }
        analysis.metadata_timeout_secs = timeout;
    }
    if args.no_landmarks {
        analysis.prefer_landmarks = false;
    }
    analysis.validate()?;

    let mut media = config.media.clone();
    if args.max_width.is_some() {
        media.max_decode_width = args.max_width;
    }
    if !FfmpegFrameSource::is_available(&media) {
        anyhow::bail!(
            "{} and {} are required on PATH (run `poise check`)",
            media.ffmpeg_bin,
            media.ffprobe_bin
        );
    }

    let handle = VideoHandle::from_path(&args.video)?;
    if !args.json {
        println!("Analyzing: {}", handle.path().display());
    }

    // Replayed records are matched to the nearest sample within half a step.
    let provider = args
        .landmarks
        .map(|path| ReplayLandmarks::new(path, analysis.sample_step_secs / 2.0));
    let mut orchestrator = AnalysisOrchestrator::new(
        OrchestratorConfig::from(&analysis),
        provider.as_ref().map(|p| p as &dyn LandmarkProvider),
    );

    let cancel = orchestrator.cancel_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current frame");
            cancel.cancel();
        }
    });

    let mut source = FfmpegFrameSource::new(handle, media);
    let outcome = orchestrator.run(&mut source).await;
    interrupt.abort();

    if config.history.enabled && !args.no_history {
        let path = args.history.unwrap_or_else(|| config.history.path.clone());
        match JsonlHistory::open(&path).and_then(|mut h| record_outcome(&mut h, &outcome)) {
            Ok(true) => tracing::info!(path = %path.display(), "Run added to history"),
            Ok(false) => tracing::debug!("Failed run not added to history"),
            Err(e) => tracing::warn!(error = %e, "Could not update history"),
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_report(&outcome);
    }

    Ok(())
}

fn print_report(outcome: &AnalysisOutcome) {
    let result = &outcome.result;
    let status = match outcome.status {
        AnalysisStatus::Completed => "completed".to_string(),
        AnalysisStatus::Partial => "partial (stopped early)".to_string(),
        AnalysisStatus::Failed(kind) => format!("failed ({kind:?}); showing default scores"),
    };

    println!();
    println!("Poise Analysis");
    println!("{}", "=".repeat(50));
    println!("  Status:        {status}");
    println!(
        "  Samples:       {} ({} detector)",
        outcome.frames_sampled,
        outcome.detector_mode.as_str()
    );
    println!("  Duration:      {:.1}s", outcome.duration_secs);
    println!(
        "  Face visible:  {:.0}%",
        outcome.face_detection_rate * 100.0
    );
    println!("  Took:          {:.1}s", outcome.elapsed_secs);
    println!();
    println!("  Overall        {}/100", result.overall_score);
    for (name, dim) in result.dimensions() {
        println!("  {:<14} {:>3}  {}", name, dim.score, dim.feedback);
    }

    if !result.recommendations.is_empty() {
        println!();
        println!("Recommendations:");
        for (i, rec) in result.recommendations.iter().enumerate() {
            println!("  {}. {rec}", i + 1);
        }
    }
}
