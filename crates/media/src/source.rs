//! The frame source contract used by the analysis loop.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use poise_analysis_model::{RasterFrame, VideoMetadata};
use poise_common::error::{PoiseError, PoiseResult};

/// Reference to a video owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoHandle {
    path: PathBuf,
}

impl VideoHandle {
    /// Reference a video file on disk.
    pub fn from_path(path: impl Into<PathBuf>) -> PoiseResult<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(PoiseError::FileNotFound { path });
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Seekable source of decoded frames.
///
/// Callers request monotonically non-decreasing timestamps. Implementations
/// may rely on that for efficiency but must not require it.
#[async_trait]
pub trait FrameSource: Send {
    /// Load duration and dimensions. May wait on I/O; callers bound the wait.
    async fn metadata(&mut self) -> PoiseResult<VideoMetadata>;

    /// Decode the frame at `timestamp_secs`, clamped to `[0, duration]`.
    ///
    /// Fails with [`PoiseError::Seek`] or [`PoiseError::Decode`] when that one
    /// frame cannot be produced.
    async fn frame_at(&mut self, timestamp_secs: f64) -> PoiseResult<RasterFrame>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Clamp a requested timestamp into the playable range.
pub fn clamp_timestamp(timestamp_secs: f64, duration_secs: f64) -> f64 {
    if !timestamp_secs.is_finite() {
        return 0.0;
    }
    timestamp_secs.clamp(0.0, duration_secs.max(0.0))
}
