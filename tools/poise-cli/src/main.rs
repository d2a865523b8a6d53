//! Poise CLI: score on-camera delivery in practice recordings.
//!
//! Usage:
//!   poise analyze <VIDEO>      Analyze a recording and print the scores
//!   poise history              Show past runs and the overall trend
//!   poise check                Check ffmpeg availability and paths

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use poise_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "poise",
    about = "Behavioral feedback for interview and presentation practice videos",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a video recording
    Analyze {
        /// Path to the video file
        video: PathBuf,

        /// Seconds between sampled frames
        #[arg(long)]
        step: Option<f64>,

        /// Seconds to wait for video metadata before giving up
        #[arg(long)]
        metadata_timeout: Option<f64>,

        /// Face-mesh landmark export (JSONL) to use instead of pixel heuristics
        #[arg(long)]
        landmarks: Option<PathBuf>,

        /// Always use the pixel-heuristic detector
        #[arg(long)]
        no_landmarks: bool,

        /// Print the full outcome as JSON
        #[arg(long)]
        json: bool,

        /// Do not append this run to the history file
        #[arg(long)]
        no_history: bool,

        /// History file (defaults to the configured path)
        #[arg(long)]
        history: Option<PathBuf>,

        /// Downscale decoded frames to at most this width
        #[arg(long)]
        max_width: Option<u32>,
    },

    /// Show past analysis runs
    History {
        /// History file (defaults to the configured path)
        #[arg(long)]
        history: Option<PathBuf>,

        /// Number of most recent runs to list
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Check system capabilities
    Check {
        /// Write a default config file if none exists
        #[arg(long)]
        init_config: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    poise_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Analyze {
            video,
            step,
            metadata_timeout,
            landmarks,
            no_landmarks,
            json,
            no_history,
            history,
            max_width,
        } => {
            commands::analyze::run(
                commands::analyze::AnalyzeArgs {
                    video,
                    step,
                    metadata_timeout,
                    landmarks,
                    no_landmarks,
                    json,
                    no_history,
                    history,
                    max_width,
                },
                config,
            )
            .await
        }
        Commands::History { history, limit } => commands::history::run(history, limit, &config),
        Commands::Check { init_config } => commands::check::run(init_config, &config),
    }
}
