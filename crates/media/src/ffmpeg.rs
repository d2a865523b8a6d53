//! ffprobe/ffmpeg-backed frame source.
//!
//! Metadata comes from one `ffprobe` call. Each sampled frame is a separate
//! `ffmpeg` invocation that input-seeks to the timestamp and writes a single
//! `rgb24` frame to stdout, always scaled to the negotiated decode size so
//! the byte count is predictable.

use std::process::{Command, Stdio};

use async_trait::async_trait;
use poise_analysis_model::{FrameDims, RasterFrame, VideoMetadata};
use poise_common::config::MediaConfig;
use poise_common::error::{PoiseError, PoiseResult};
use serde::Deserialize;

use crate::source::{clamp_timestamp, FrameSource, VideoHandle};

/// Frame source that shells out to ffprobe and ffmpeg.
pub struct FfmpegFrameSource {
    handle: VideoHandle,
    config: MediaConfig,
    metadata: Option<VideoMetadata>,
    decode_dims: Option<FrameDims>,
}

impl FfmpegFrameSource {
    pub fn new(handle: VideoHandle, config: MediaConfig) -> Self {
        Self {
            handle,
            config,
            metadata: None,
            decode_dims: None,
        }
    }

    /// Whether both binaries are on `PATH`.
    pub fn is_available(config: &MediaConfig) -> bool {
        command_exists(&config.ffmpeg_bin) && command_exists(&config.ffprobe_bin)
    }

    async fn probe(&self) -> PoiseResult<VideoMetadata> {
        let output = tokio::process::Command::new(&self.config.ffprobe_bin)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height:format=duration",
                "-of",
                "json",
            ])
            .arg(self.handle.path())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                PoiseError::unsupported(format!(
                    "Failed to start {}: {e}",
                    self.config.ffprobe_bin
                ))
            })?;

        if !output.status.success() {
            return Err(PoiseError::decode(format!(
                "ffprobe failed (status {}): {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_probe_output(&String::from_utf8_lossy(&output.stdout))
    }
}

#[async_trait]
impl FrameSource for FfmpegFrameSource {
    async fn metadata(&mut self) -> PoiseResult<VideoMetadata> {
        if let Some(meta) = self.metadata {
            return Ok(meta);
        }

        let meta = self.probe().await?;
        let dims = decode_dims_for(&meta, self.config.max_decode_width);
        tracing::info!(
            path = %self.handle.path().display(),
            duration_secs = meta.duration_secs,
            width = meta.width,
            height = meta.height,
            decode_width = dims.width,
            decode_height = dims.height,
            "Video metadata loaded"
        );

        self.metadata = Some(meta);
        self.decode_dims = Some(dims);
        Ok(meta)
    }

    async fn frame_at(&mut self, timestamp_secs: f64) -> PoiseResult<RasterFrame> {
        let meta = self.metadata().await?;
        let dims = self
            .decode_dims
            .unwrap_or_else(|| decode_dims_for(&meta, self.config.max_decode_width));
        let t = clamp_timestamp(timestamp_secs, meta.duration_secs);

        let output = tokio::process::Command::new(&self.config.ffmpeg_bin)
            .args(frame_args(self.handle.path(), t, dims))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                PoiseError::seek(t, format!("Failed to start {}: {e}", self.config.ffmpeg_bin))
            })?;

        if !output.status.success() {
            return Err(PoiseError::seek(
                t,
                format!(
                    "ffmpeg failed (status {}): {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        let expected = dims.width as usize * dims.height as usize * 3;
        let got = output.stdout.len();
        RasterFrame::from_rgb24(t, dims.width, dims.height, output.stdout).ok_or_else(|| {
            PoiseError::seek(
                t,
                format!("expected {expected} bytes of rgb24, ffmpeg produced {got}"),
            )
        })
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    // ffprobe prints numbers as strings in JSON mode.
    duration: Option<String>,
}

/// Parse `ffprobe -of json` output into metadata.
fn parse_probe_output(raw: &str) -> PoiseResult<VideoMetadata> {
    let probe: ProbeOutput = serde_json::from_str(raw)
        .map_err(|e| PoiseError::decode(format!("Unreadable ffprobe output: {e}")))?;

    let stream = probe
        .streams
        .first()
        .ok_or_else(|| PoiseError::decode("No video stream found in container"))?;
    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err(PoiseError::decode("Video stream has no dimensions")),
    };

    let duration_secs = probe
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| PoiseError::decode("Video duration is missing or not finite"))?;

    Ok(VideoMetadata {
        duration_secs,
        width,
        height,
    })
}

/// Output size for decoded frames, downscaled to `max_width` when wider.
/// Dimensions stay even for chroma-subsampled scalers.
fn decode_dims_for(meta: &VideoMetadata, max_width: Option<u32>) -> FrameDims {
    match max_width {
        Some(max_w) if max_w > 0 && meta.width > max_w => {
            let scale = max_w as f64 / meta.width as f64;
            let w = (max_w & !1).max(2);
            let h = (((meta.height as f64 * scale).round() as u32) & !1).max(2);
            FrameDims::new(w, h)
        }
        _ => FrameDims::new(meta.width, meta.height),
    }
}

fn frame_args(path: &std::path::Path, timestamp_secs: f64, dims: FrameDims) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-ss".to_string(),
        format!("{timestamp_secs:.3}"),
        "-i".to_string(),
        path.display().to_string(),
        "-frames:v".to_string(),
        "1".to_string(),
        "-vf".to_string(),
        format!("scale={}:{}", dims.width, dims.height),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pix_fmt".to_string(),
        "rgb24".to_string(),
        "-".to_string(),
    ]
}

fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_probe_output() {
        let raw = r#"{
            "programs": [],
            "streams": [{"width": 1280, "height": 720}],
            "format": {"duration": "62.080000"}
        }"#;
        let meta = parse_probe_output(raw).unwrap();
        assert_eq!(meta.width, 1280);
        assert_eq!(meta.height, 720);
        assert!((meta.duration_secs - 62.08).abs() < 1e-9);
    }

    #[test]
    fn test_probe_without_duration_is_decode_error() {
        let raw = r#"{"streams": [{"width": 640, "height": 480}], "format": {"duration": "N/A"}}"#;
        let err = parse_probe_output(raw).unwrap_err();
        assert!(matches!(err, PoiseError::Decode { .. }));
    }

    #[test]
    fn test_probe_without_video_stream_is_decode_error() {
        let raw = r#"{"streams": [], "format": {"duration": "3.0"}}"#;
        assert!(matches!(
            parse_probe_output(raw),
            Err(PoiseError::Decode { .. })
        ));
        assert!(matches!(
            parse_probe_output("not json"),
            Err(PoiseError::Decode { .. })
        ));
    }

    #[test]
    fn test_decode_dims_downscale_keeps_aspect_and_even() {
        let meta = VideoMetadata {
            duration_secs: 10.0,
            width: 1920,
            height: 1080,
        };
        assert_eq!(decode_dims_for(&meta, None), FrameDims::new(1920, 1080));
        assert_eq!(decode_dims_for(&meta, Some(640)), FrameDims::new(640, 360));
        assert_eq!(decode_dims_for(&meta, Some(4000)), FrameDims::new(1920, 1080));

        let odd = VideoMetadata {
            duration_secs: 1.0,
            width: 1000,
            height: 750,
        };
        let dims = decode_dims_for(&odd, Some(321));
        assert_eq!(dims.width % 2, 0);
        assert_eq!(dims.height % 2, 0);
    }

    #[test]
    fn test_frame_args_seek_before_input() {
        let args = frame_args(&PathBuf::from("/tmp/a.mp4"), 1.5, FrameDims::new(320, 240));
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert!(ss < input);
        assert_eq!(args[ss + 1], "1.500");
        assert!(args.contains(&"scale=320:240".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("-"));
    }
}
