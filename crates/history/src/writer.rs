//! Append-only history writer.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use poise_analysis_model::{AnalysisOutcome, HistoryRecord};
use poise_common::error::{PoiseError, PoiseResult};

/// Destination for completed-run records.
pub trait HistorySink {
    fn append(&mut self, record: &HistoryRecord) -> PoiseResult<()>;
}

/// Appends one JSON object per line to a history file.
///
/// Existing records are never rewritten. Each record is flushed as soon as
/// it is written so a crash loses at most the record in flight.
pub struct JsonlHistory {
    writer: BufWriter<File>,
    records_written: u64,
}

impl JsonlHistory {
    /// Open (or create) the history file for appending.
    pub fn open(path: impl Into<PathBuf>) -> PoiseResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                PoiseError::history(format!("Cannot open {}: {e}", path.display()))
            })?;

        Ok(Self {
            writer: BufWriter::new(file),
            records_written: 0,
        })
    }

    pub fn flush(&mut self) -> PoiseResult<()> {
        self.writer
            .flush()
            .map_err(|e| PoiseError::history(format!("Failed to flush history: {e}")))
    }

    /// Records written through this handle.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }
}

impl HistorySink for JsonlHistory {
    fn append(&mut self, record: &HistoryRecord) -> PoiseResult<()> {
        let json = serde_json::to_string(record)?;
        writeln!(self.writer, "{json}")
            .map_err(|e| PoiseError::history(format!("Failed to write record: {e}")))?;
        self.flush()?;
        self.records_written += 1;
        Ok(())
    }
}

impl Drop for JsonlHistory {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Append the outcome's record, stamped with the current time.
///
/// Returns `false` without writing for failed runs.
pub fn record_outcome(
    sink: &mut dyn HistorySink,
    outcome: &AnalysisOutcome,
) -> PoiseResult<bool> {
    let date = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    match outcome.history_record(date) {
        Some(record) => {
            sink.append(&record)?;
            tracing::debug!(overall = record.overall_score, "History record appended");
            Ok(true)
        }
        None => Ok(false),
    }
}
