//! Decoded frames and video metadata.

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::geometry::FrameDims;

/// Container-level facts about a video, available once metadata has loaded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Total duration in seconds.
    pub duration_secs: f64,
    /// Native frame width (pixels).
    pub width: u32,
    /// Native frame height (pixels).
    pub height: u32,
}

/// A decoded RGB frame at a given position in the video.
///
/// Frames are consumed by exactly one detector call and then dropped.
#[derive(Debug, Clone)]
pub struct RasterFrame {
    /// Position in the video (seconds).
    pub timestamp_secs: f64,
    image: RgbImage,
}

impl RasterFrame {
    pub fn new(timestamp_secs: f64, image: RgbImage) -> Self {
        Self {
            timestamp_secs,
            image,
        }
    }

    /// Wrap a packed `rgb24` buffer. Returns `None` when the buffer size does
    /// not match `width * height * 3`.
    pub fn from_rgb24(timestamp_secs: f64, width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        RgbImage::from_raw(width, height, data).map(|image| Self::new(timestamp_secs, image))
    }

    /// A frame filled with a single color.
    pub fn solid(timestamp_secs: f64, width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self::new(
            timestamp_secs,
            RgbImage::from_pixel(width, height, image::Rgb(rgb)),
        )
    }

    pub fn dims(&self) -> FrameDims {
        FrameDims::new(self.image.width(), self.image.height())
    }

    /// RGB triple at `(x, y)`. Callers must stay within [`Self::dims`].
    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        self.image.get_pixel(x, y).0
    }
}
