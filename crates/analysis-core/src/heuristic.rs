//! Pixel-heuristic face detection.
//!
//! No model is involved. The frame is sampled on a coarse grid and split into
//! a centered circular face region and the surrounding background. Lighting,
//! contrast against the background, flesh-tone coverage and the share of the
//! circle lying in its upper half (where the eyes sit) are combined into a
//! weighted confidence.

use poise_analysis_model::{DetectorMode, FrameObservation, Point, RasterFrame};

use crate::detector::Detector;
use crate::thresholds::HeuristicThresholds;

/// Detector that needs nothing but pixels.
#[derive(Debug, Clone, Default)]
pub struct HeuristicDetector {
    thresholds: HeuristicThresholds,
}

/// Raw region statistics for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionStats {
    pub face_brightness: f64,
    pub background_brightness: f64,
    pub skin_tone_ratio: f64,
    /// Share of face-region samples in the upper half of the circle.
    pub eye_region_ratio: f64,
    /// Centroid of skin-tone samples, if any matched.
    pub skin_centroid: Option<Point>,
}

impl RegionStats {
    pub fn brightness_diff(&self) -> f64 {
        self.face_brightness - self.background_brightness
    }
}

impl HeuristicDetector {
    pub fn new() -> Self {
        Self::with_thresholds(HeuristicThresholds::DEFAULT)
    }

    pub fn with_thresholds(thresholds: HeuristicThresholds) -> Self {
        Self { thresholds }
    }

    /// Gather region statistics. `None` when the face region is empty.
    pub fn region_stats(&self, frame: &RasterFrame) -> Option<RegionStats> {
        let dims = frame.dims();
        if dims.is_empty() {
            return None;
        }

        let center = dims.center();
        let radius = dims.min_side() / self.thresholds.face_radius_divisor;
        let radius_sq = radius * radius;
        let stride = self.thresholds.grid_stride.max(1) as usize;

        let mut face_sum = 0.0;
        let mut face_n = 0u64;
        let mut background_sum = 0.0;
        let mut background_n = 0u64;
        let mut skin_n = 0u64;
        let mut upper_n = 0u64;
        let (mut skin_x, mut skin_y) = (0.0, 0.0);

        for y in (0..dims.height).step_by(stride) {
            let dy = y as f64 - center.y;
            for x in (0..dims.width).step_by(stride) {
                let dx = x as f64 - center.x;
                let rgb = frame.rgb(x, y);
                let luma = luma(rgb);

                if dx * dx + dy * dy <= radius_sq {
                    face_sum += luma;
                    face_n += 1;
                    if is_skin_tone(rgb) {
                        skin_n += 1;
                        skin_x += x as f64;
                        skin_y += y as f64;
                    }
                    if dy < 0.0 {
                        upper_n += 1;
                    }
                } else {
                    background_sum += luma;
                    background_n += 1;
                }
            }
        }

        if face_n == 0 {
            return None;
        }

        let face_brightness = face_sum / face_n as f64;
        let background_brightness = if background_n > 0 {
            background_sum / background_n as f64
        } else {
            face_brightness
        };

        let skin_centroid =
            (skin_n > 0).then(|| Point::new(skin_x / skin_n as f64, skin_y / skin_n as f64));

        Some(RegionStats {
            face_brightness,
            background_brightness,
            skin_tone_ratio: skin_n as f64 / face_n as f64,
            eye_region_ratio: upper_n as f64 / face_n as f64,
            skin_centroid,
        })
    }

    /// Turn region statistics into an observation.
    pub fn classify(&self, stats: &RegionStats, frame_center: Point) -> FrameObservation {
        let t = &self.thresholds;
        let diff = stats.brightness_diff();

        let has_good_lighting = stats.face_brightness > t.min_face_brightness
            && stats.face_brightness < t.max_face_brightness;
        let has_contrast = diff.abs() > t.min_contrast;
        let has_skin_tone = stats.skin_tone_ratio > t.min_skin_ratio;
        let has_eye_region = stats.eye_region_ratio > t.min_eye_ratio;

        let face_confidence = t.lighting_weight * flag(has_good_lighting)
            + t.contrast_weight * flag(has_contrast)
            + t.skin_weight * flag(has_skin_tone)
            + t.eye_weight * flag(has_eye_region);

        if face_confidence <= t.detection_confidence {
            return FrameObservation::absent(DetectorMode::Heuristic);
        }

        let lighting_quality = (stats.face_brightness / t.lighting_norm).min(1.0);
        let contrast_quality = (diff.abs() / t.contrast_norm).min(1.0);
        let skin_quality = (stats.skin_tone_ratio * t.skin_gain).min(1.0);

        let gaze_centered = skin_quality > t.gaze_min_skin_quality
            && stats.eye_region_ratio > t.gaze_min_eye_ratio
            && lighting_quality > t.gaze_min_lighting_quality;
        let size_ok = skin_quality > t.size_min_skin_quality
            && contrast_quality > t.size_min_contrast_quality;
        let centered = lighting_quality > t.center_min_lighting_quality
            && contrast_quality > t.center_min_contrast_quality;

        let center = stats.skin_centroid.unwrap_or(frame_center);
        FrameObservation::detected(DetectorMode::Heuristic, center)
            .with_gaze(gaze_centered)
            .with_size_ok(size_ok)
            .with_centered(centered)
            .with_eye_region_ratio(stats.eye_region_ratio)
    }
}

impl Detector for HeuristicDetector {
    fn observe(&mut self, frame: &RasterFrame) -> FrameObservation {
        match self.region_stats(frame) {
            Some(stats) => self.classify(&stats, frame.dims().center()),
            None => FrameObservation::absent(DetectorMode::Heuristic),
        }
    }

    fn mode(&self) -> DetectorMode {
        DetectorMode::Heuristic
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Rec. 601 luma.
fn luma([r, g, b]: [u8; 3]) -> f64 {
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
}

/// Flesh-tone test: any of three RGB rules.
///
/// 1. Uniform daylight: bright red-dominant pixels with spread channels.
/// 2. Flash or strong lateral light: near-saturated, blue lowest.
/// 3. Dim light or darker complexions: ordered `r > g > b` with a red lead.
pub fn is_skin_tone([r, g, b]: [u8; 3]) -> bool {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);

    let daylight = r > 95
        && g > 40
        && b > 20
        && max - min > 15
        && (r - g).abs() > 15
        && r > g
        && r > b;
    let flash = r > 220 && g > 210 && b > 170 && (r - g).abs() <= 15 && r > b && g > b;
    let dim = r > 60 && g > 40 && b > 20 && r > g && g > b && r - b > 20;

    daylight || flash || dim
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    const SKIN: [u8; 3] = [200, 150, 120];
    const EYE: [u8; 3] = [30, 30, 30];
    const BACKDROP: [u8; 3] = [40, 40, 40];

    /// Backdrop with a skin disc filling the face region and a dark band in
    /// its upper half.
    fn face_frame(width: u32, height: u32, offset_x: f64) -> RasterFrame {
        let cx = width as f64 / 2.0 + offset_x;
        let cy = height as f64 / 2.0;
        let r = width.min(height) as f64 / 5.0;
        let image = RgbImage::from_fn(width, height, |x, y| {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            if dx * dx + dy * dy > r * r {
                return Rgb(BACKDROP);
            }
            let in_eye_band = dy >= -0.5 * r && dy < -0.2 * r && dx.abs() < 0.6 * r;
            Rgb(if in_eye_band { EYE } else { SKIN })
        });
        RasterFrame::new(0.0, image)
    }

    /// Evenly lit skin disc on a backdrop of almost the same brightness.
    fn flat_disc_frame(width: u32, height: u32) -> RasterFrame {
        let cx = width as f64 / 2.0;
        let cy = height as f64 / 2.0;
        let r = width.min(height) as f64 / 5.0;
        let image = RgbImage::from_fn(width, height, |x, y| {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            Rgb(if dx * dx + dy * dy <= r * r {
                SKIN
            } else {
                [175, 160, 150]
            })
        });
        RasterFrame::new(0.0, image)
    }

    #[test]
    fn test_skin_tone_rules() {
        assert!(is_skin_tone(SKIN));
        assert!(is_skin_tone([240, 225, 200]));
        assert!(is_skin_tone([110, 80, 60]));
        assert!(!is_skin_tone([128, 128, 128]));
        assert!(!is_skin_tone(EYE));
        assert!(!is_skin_tone([40, 90, 200]));
    }

    #[test]
    fn test_synthetic_face_is_detected_with_all_flags() {
        let mut detector = HeuristicDetector::new();
        let frame = face_frame(320, 240, 0.0);

        let stats = detector.region_stats(&frame).unwrap();
        assert!(stats.skin_tone_ratio > 0.8);
        assert!(stats.eye_region_ratio > 0.4 && stats.eye_region_ratio <= 0.5);
        assert!(stats.brightness_diff() > 50.0);

        let obs = detector.observe(&frame);
        assert!(obs.face_detected);
        assert!(obs.gaze_centered);
        assert!(obs.size_ok);
        assert!(obs.centered);
        assert_eq!(obs.mode, DetectorMode::Heuristic);
        let center = obs.face_center.unwrap();
        assert!((center.x - 160.0).abs() < 2.0);
    }

    #[test]
    fn test_upper_half_share_ignores_pixel_values() {
        let detector = HeuristicDetector::new();
        let banded = detector.region_stats(&face_frame(320, 240, 0.0)).unwrap();
        let flat = detector.region_stats(&flat_disc_frame(320, 240)).unwrap();
        assert_eq!(banded.eye_region_ratio, flat.eye_region_ratio);
    }

    #[test]
    fn test_evenly_lit_face_without_contrast_is_detected() {
        // Lighting, skin and eye region: 0.3 + 0.3 + 0.15 = 0.75.
        let mut detector = HeuristicDetector::new();
        let frame = flat_disc_frame(320, 240);

        let stats = detector.region_stats(&frame).unwrap();
        assert!(stats.eye_region_ratio > 0.4);
        assert!(stats.brightness_diff().abs() < 8.0);
        assert_eq!(stats.skin_tone_ratio, 1.0);

        let obs = detector.observe(&frame);
        assert!(obs.face_detected);
        assert!(obs.gaze_centered);
        // Low contrast blocks size and centering eligibility.
        assert!(!obs.size_ok);
        assert!(!obs.centered);
    }

    #[test]
    fn test_uniform_gray_frame_has_no_face() {
        let mut detector = HeuristicDetector::new();
        let obs = detector.observe(&RasterFrame::solid(0.0, 160, 120, [128, 128, 128]));
        assert!(!obs.face_detected);
        assert!(obs.face_center.is_none());
    }

    #[test]
    fn test_black_frame_has_no_face() {
        let mut detector = HeuristicDetector::new();
        let obs = detector.observe(&RasterFrame::solid(0.0, 160, 120, [0, 0, 0]));
        assert!(!obs.face_detected);
    }

    #[test]
    fn test_empty_frame_is_absent() {
        let mut detector = HeuristicDetector::new();
        let frame = RasterFrame::new(0.0, RgbImage::new(0, 0));
        assert!(!detector.observe(&frame).face_detected);
    }

    #[test]
    fn test_confidence_of_exactly_threshold_is_not_a_face() {
        // Lighting and skin only: 0.3 + 0.3 is not above 0.6.
        let detector = HeuristicDetector::new();
        let stats = RegionStats {
            face_brightness: 150.0,
            background_brightness: 148.0,
            skin_tone_ratio: 0.5,
            eye_region_ratio: 0.0,
            skin_centroid: None,
        };
        let obs = detector.classify(&stats, Point::new(50.0, 50.0));
        assert!(!obs.face_detected);

        let with_eyes = RegionStats {
            eye_region_ratio: 0.06,
            ..stats
        };
        let obs = detector.classify(&with_eyes, Point::new(50.0, 50.0));
        assert!(obs.face_detected);
        // Falls back to the frame center without skin samples.
        assert_eq!(obs.face_center, Some(Point::new(50.0, 50.0)));
        assert!(!obs.size_ok);
        assert!(!obs.centered);
        // 0.06 clears detection but not the gaze cutoff.
        assert!(!obs.gaze_centered);
    }

    #[test]
    fn test_face_shift_moves_skin_centroid() {
        let mut detector = HeuristicDetector::new();
        let a = detector.observe(&face_frame(320, 240, 0.0)).face_center.unwrap();
        let b = detector.observe(&face_frame(320, 240, 12.0)).face_center.unwrap();
        assert!(b.x > a.x);
    }
}
