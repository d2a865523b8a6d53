//! Check system capabilities.

use poise_common::config::{config_file_path, AppConfig};
use poise_history::read_history;
use poise_media::FfmpegFrameSource;

pub fn run(init_config: bool, config: &AppConfig) -> anyhow::Result<()> {
    println!("Poise System Check");
    println!("{}", "=".repeat(50));

    let media = &config.media;
    if FfmpegFrameSource::is_available(media) {
        println!(
            "[OK] Decoder: {} / {} found on PATH",
            media.ffmpeg_bin, media.ffprobe_bin
        );
    } else {
        println!(
            "[MISSING] Decoder: {} / {} not found on PATH",
            media.ffmpeg_bin, media.ffprobe_bin
        );
        println!("     Install FFmpeg (e.g. `apt install ffmpeg` or `brew install ffmpeg`).");
    }

    let config_path = config_file_path();
    if config_path.exists() {
        println!("[OK] Config: {}", config_path.display());
    } else if init_config {
        config.save()?;
        println!("[OK] Config: wrote defaults to {}", config_path.display());
    } else {
        println!(
            "[INFO] Config: {} (not present, using defaults)",
            config_path.display()
        );
    }

    let history_path = &config.history.path;
    if config.history.enabled {
        match read_history(history_path) {
            Ok(records) => println!(
                "[OK] History: {} ({} runs)",
                history_path.display(),
                records.len()
            ),
            Err(e) => println!("[WARN] History: {e}"),
        }
    } else {
        println!("[INFO] History: disabled");
    }

    let analysis = &config.analysis;
    println!(
        "[INFO] Sampling every {}s, metadata timeout {}s, landmarks {}",
        analysis.sample_step_secs,
        analysis.metadata_timeout_secs,
        if analysis.prefer_landmarks {
            "preferred when an export is given"
        } else {
            "disabled"
        }
    );

    Ok(())
}
