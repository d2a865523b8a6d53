//! Poise Media
//!
//! Frame sources feed the analysis loop with decoded frames:
//! - **FrameSource:** async trait for metadata and timestamp seeks
//! - **FfmpegFrameSource:** ffprobe for metadata, one ffmpeg decode per sample
//!
//! Formats are opaque here. Decode failures are reported, not interpreted.

pub mod ffmpeg;
pub mod source;

pub use ffmpeg::FfmpegFrameSource;
pub use source::{FrameSource, VideoHandle};
