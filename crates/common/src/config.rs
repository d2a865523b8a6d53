//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{PoiseError, PoiseResult};
use std::time::Duration;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Frame sampling and detector settings.
    pub analysis: AnalysisDefaults,

    /// Video decoding settings.
    pub media: MediaConfig,

    /// Where completed runs are recorded.
    pub history: HistoryConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Sampling loop parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisDefaults {
    /// Distance between sampled timestamps (seconds).
    pub sample_step_secs: f64,

    /// Hard bound on waiting for video metadata (seconds).
    pub metadata_timeout_secs: f64,

    /// Pause between sampling steps so a host event loop is not starved.
    /// Zero means a plain cooperative yield.
    pub yield_pause_ms: u64,

    /// Try the landmark detector before falling back to the heuristic one.
    pub prefer_landmarks: bool,
}

/// ffmpeg/ffprobe settings for the default frame source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// ffmpeg binary name or path.
    pub ffmpeg_bin: String,

    /// ffprobe binary name or path.
    pub ffprobe_bin: String,

    /// Downscale decoded frames wider than this (pixels). `None` keeps the
    /// native resolution.
    pub max_decode_width: Option<u32>,
}

/// History sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Append a record after each completed run.
    pub enabled: bool,

    /// JSONL file receiving records.
    pub path: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "poise=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AnalysisDefaults {
    fn default() -> Self {
        Self {
            sample_step_secs: 0.3,
            metadata_timeout_secs: 10.0,
            yield_pause_ms: 5,
            prefer_landmarks: true,
        }
    }
}

impl AnalysisDefaults {
    pub fn metadata_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.metadata_timeout_secs.max(0.0)).unwrap_or(Duration::MAX)
    }

    pub fn yield_pause(&self) -> Duration {
        Duration::from_millis(self.yield_pause_ms)
    }

    /// Reject settings that would produce an empty schedule or no metadata wait.
    pub fn validate(&self) -> PoiseResult<()> {
        if !self.sample_step_secs.is_finite() || self.sample_step_secs <= 0.0 {
            return Err(PoiseError::config(format!(
                "sample_step_secs must be a positive number of seconds, got {}",
                self.sample_step_secs
            )));
        }
        if !self.metadata_timeout_secs.is_finite() || self.metadata_timeout_secs <= 0.0 {
            return Err(PoiseError::config(format!(
                "metadata_timeout_secs must be a positive number of seconds, got {}",
                self.metadata_timeout_secs
            )));
        }
        Ok(())
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
            max_decode_width: None,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_history_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("poise").join("config.json")
}

/// Default history file location.
pub fn default_history_path() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("poise").join("history.jsonl")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_sampling() {
        let config = AppConfig::default();
        assert!((config.analysis.sample_step_secs - 0.3).abs() < 1e-12);
        assert_eq!(config.analysis.metadata_timeout(), Duration::from_secs(10));
        assert!(config.history.enabled);
        assert!(config.history.path.ends_with("poise/history.jsonl"));
    }

    #[test]
    fn test_partial_config_fills_missing_sections() {
        let config: AppConfig =
            serde_json::from_str(r#"{"analysis":{"sample_step_secs":0.5}}"#).unwrap();
        assert!((config.analysis.sample_step_secs - 0.5).abs() < 1e-12);
        assert!((config.analysis.metadata_timeout_secs - 10.0).abs() < 1e-12);
        assert_eq!(config.media.ffmpeg_bin, "ffmpeg");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validate_rejects_unusable_sampling() {
        assert!(AnalysisDefaults::default().validate().is_ok());

        for step in [0.0, -0.3, f64::NAN] {
            let analysis = AnalysisDefaults {
                sample_step_secs: step,
                ..AnalysisDefaults::default()
            };
            let err = analysis.validate().unwrap_err();
            assert!(matches!(err, PoiseError::Config { .. }));
        }

        let analysis = AnalysisDefaults {
            metadata_timeout_secs: 0.0,
            ..AnalysisDefaults::default()
        };
        assert!(analysis.validate().is_err());
    }
}
