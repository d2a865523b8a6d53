//! Error types shared across Poise crates.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level error type for Poise operations.
#[derive(Debug, thiserror::Error)]
pub enum PoiseError {
    #[error("Video metadata not available within {secs:.1}s")]
    MetadataTimeout { secs: f64 },

    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Seek error at {timestamp_secs:.3}s: {message}")]
    Seek { timestamp_secs: f64, message: String },

    #[error("Detector initialization failed: {message}")]
    DetectorInit { message: String },

    #[error("Analysis error: {message}")]
    Analysis { message: String },

    #[error("History error: {message}")]
    History { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using PoiseError.
pub type PoiseResult<T> = Result<T, PoiseError>;

/// Coarse failure category used to tailor fallback advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Metadata did not load within the bounded wait.
    Timeout,
    /// The container or codec could not be decoded.
    Format,
    /// Cancelled before any frame was analyzed.
    Cancelled,
    /// Anything else.
    Unknown,
}

impl PoiseError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            message: msg.into(),
        }
    }

    pub fn seek(timestamp_secs: f64, msg: impl Into<String>) -> Self {
        Self::Seek {
            timestamp_secs,
            message: msg.into(),
        }
    }

    pub fn detector_init(msg: impl Into<String>) -> Self {
        Self::DetectorInit {
            message: msg.into(),
        }
    }

    pub fn analysis(msg: impl Into<String>) -> Self {
        Self::Analysis {
            message: msg.into(),
        }
    }

    pub fn history(msg: impl Into<String>) -> Self {
        Self::History {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Whether the error only affects a single sampled frame.
    pub fn is_frame_local(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::Seek { .. })
    }

    /// Classify the error for the fallback path.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::MetadataTimeout { .. } => FailureKind::Timeout,
            Self::Decode { .. } | Self::Seek { .. } | Self::FileNotFound { .. } => {
                FailureKind::Format
            }
            Self::Unsupported { message } if mentions_format(message) => FailureKind::Format,
            _ => FailureKind::Unknown,
        }
    }
}

fn mentions_format(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    ["codec", "format", "container"]
        .iter()
        .any(|needle| lower.contains(needle))
}
