//! Reading the history file back and summarizing it.

use std::path::Path;

use poise_analysis_model::HistoryRecord;
use poise_common::error::{PoiseError, PoiseResult};

/// Read every record in a history file, oldest first.
///
/// A missing file is an empty history. Unparseable lines are skipped with a
/// warning so one bad write does not hide the rest.
pub fn read_history(path: &Path) -> PoiseResult<Vec<HistoryRecord>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(PoiseError::history(format!(
                "Cannot read {}: {e}",
                path.display()
            )))
        }
    };
    Ok(parse_history(&content))
}

/// Parse JSONL history content, skipping blank, `#` and malformed lines.
pub fn parse_history(content: &str) -> Vec<HistoryRecord> {
    content
        .lines()
        .enumerate()
        .filter_map(|(line_no, line)| {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return None;
            }
            match serde_json::from_str(trimmed) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(line = line_no + 1, error = %e, "Skipping malformed history line");
                    None
                }
            }
        })
        .collect()
}

/// Aggregate view over a run history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySummary {
    pub count: usize,
    pub average_overall: f64,
    pub best_overall: u8,
    pub latest: HistoryRecord,
    /// Latest overall minus first overall.
    pub trend: i32,
}

impl HistorySummary {
    /// `None` for an empty history.
    pub fn from_records(records: &[HistoryRecord]) -> Option<Self> {
        let first = records.first()?;
        let latest = records.last()?;
        let total: u64 = records.iter().map(|r| r.overall_score as u64).sum();

        Some(Self {
            count: records.len(),
            average_overall: total as f64 / records.len() as f64,
            best_overall: records.iter().map(|r| r.overall_score).max().unwrap_or(0),
            latest: latest.clone(),
            trend: latest.overall_score as i32 - first.overall_score as i32,
        })
    }
}
