//! Show past analysis runs.

use std::path::PathBuf;

use poise_common::config::AppConfig;
use poise_history::{read_history, HistorySummary};

pub fn run(history: Option<PathBuf>, limit: usize, config: &AppConfig) -> anyhow::Result<()> {
    let path = history.unwrap_or_else(|| config.history.path.clone());
    let records = read_history(&path)?;

    println!("History: {}", path.display());
    let Some(summary) = HistorySummary::from_records(&records) else {
        println!("  No runs recorded yet.");
        return Ok(());
    };

    println!();
    println!(
        "  {:<26} {:>7} {:>7} {:>7} {:>7} {:>7} {:>8} {:>6}",
        "date", "overall", "posture", "eyes", "gesture", "speech", "length", "face"
    );
    let skip = records.len().saturating_sub(limit);
    for r in records.iter().skip(skip) {
        println!(
            "  {:<26} {:>7} {:>7} {:>7} {:>7} {:>7} {:>7.0}s {:>5}%",
            r.date,
            r.overall_score,
            r.posture_score,
            r.eye_contact_score,
            r.gesture_score,
            r.speech_score,
            r.duration_seconds,
            r.face_detection_rate_percent
        );
    }

    println!();
    println!("  Runs:          {}", summary.count);
    println!("  Average:       {:.1}", summary.average_overall);
    println!("  Best:          {}", summary.best_overall);
    println!("  Trend:         {:+}", summary.trend);

    Ok(())
}
