//! Poise History
//!
//! Append-only record of completed analysis runs, one JSON object per line.
//! Failed runs are never recorded; their fallback scores are not
//! measurements.

pub mod reader;
pub mod writer;

pub use reader::{parse_history, read_history, HistorySummary};
pub use writer::{record_outcome, HistorySink, JsonlHistory};
