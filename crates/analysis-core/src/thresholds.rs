//! Named threshold tables for each detector variant.
//!
//! Detectors and the accumulator read every tunable number from here so the
//! algorithms can be tested against alternative tables.

use poise_analysis_model::DetectorMode;

/// Classification of frame-to-frame face-center movement (pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementThresholds {
    /// Movement strictly below this counts as a stable posture frame.
    pub stable_below: f64,
    /// Inclusive lower bound of the natural-gesture band.
    pub gesture_min: f64,
    /// Exclusive upper bound of the natural-gesture band.
    pub gesture_max: f64,
}

impl MovementThresholds {
    pub const LANDMARK: Self = Self {
        stable_below: 15.0,
        gesture_min: 5.0,
        gesture_max: 25.0,
    };

    pub const HEURISTIC: Self = Self {
        stable_below: 20.0,
        gesture_min: 20.0,
        gesture_max: 30.0,
    };

    pub fn for_mode(mode: DetectorMode) -> Self {
        match mode {
            DetectorMode::Landmark => Self::LANDMARK,
            DetectorMode::Heuristic => Self::HEURISTIC,
        }
    }

    pub fn is_stable(&self, movement: f64) -> bool {
        movement < self.stable_below
    }

    pub fn is_natural_gesture(&self, movement: f64) -> bool {
        movement >= self.gesture_min && movement < self.gesture_max
    }
}

/// Geometry thresholds for the landmark detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkThresholds {
    /// `maxDistance = min(w, h) * max_distance_factor`.
    pub max_distance_factor: f64,
    /// Face centered within this fraction of `maxDistance` implies direct gaze.
    pub gaze_center_factor: f64,
    /// Eye centroid within this fraction of `maxDistance` implies direct gaze.
    pub eye_gaze_factor: f64,
    /// Face within this fraction of `maxDistance` counts as centered.
    pub centered_factor: f64,
    /// Exclusive lower bound of the good face-size window.
    pub min_face_box_ratio: f64,
    /// Exclusive upper bound of the good face-size window.
    pub max_face_box_ratio: f64,
    /// Keypoint count of a full face mesh.
    pub full_mesh_keypoints: usize,
}

impl LandmarkThresholds {
    pub const DEFAULT: Self = Self {
        max_distance_factor: 0.25,
        gaze_center_factor: 0.6,
        eye_gaze_factor: 0.5,
        centered_factor: 1.0,
        min_face_box_ratio: 0.08,
        max_face_box_ratio: 0.4,
        full_mesh_keypoints: 468,
    };
}

impl Default for LandmarkThresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Eye-contour indices of a 468-point face mesh (corners and lid midpoints).
pub const EYE_LANDMARK_INDICES: [usize; 8] = [33, 133, 159, 145, 362, 263, 386, 374];

/// Pixel thresholds for the heuristic detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicThresholds {
    /// Sample every n-th pixel on each axis.
    pub grid_stride: u32,
    /// Face-region radius is `min(w, h) / face_radius_divisor`.
    pub face_radius_divisor: f64,
    /// Exclusive brightness window for good lighting.
    pub min_face_brightness: f64,
    pub max_face_brightness: f64,
    /// Minimum |face - background| brightness difference.
    pub min_contrast: f64,
    /// Minimum skin-tone pixel fraction.
    pub min_skin_ratio: f64,
    /// Minimum upper-half share of the face region.
    pub min_eye_ratio: f64,
    /// Confidence weights for lighting, contrast, skin, eye.
    pub lighting_weight: f64,
    pub contrast_weight: f64,
    pub skin_weight: f64,
    pub eye_weight: f64,
    /// Confidence must exceed this to report a face.
    pub detection_confidence: f64,
    /// Normalizers for the quality scores.
    pub lighting_norm: f64,
    pub contrast_norm: f64,
    pub skin_gain: f64,
    /// Direct gaze requires all three.
    pub gaze_min_skin_quality: f64,
    pub gaze_min_eye_ratio: f64,
    pub gaze_min_lighting_quality: f64,
    /// Size/stability eligibility.
    pub size_min_skin_quality: f64,
    pub size_min_contrast_quality: f64,
    /// Centering eligibility.
    pub center_min_lighting_quality: f64,
    pub center_min_contrast_quality: f64,
}

impl HeuristicThresholds {
    pub const DEFAULT: Self = Self {
        grid_stride: 2,
        face_radius_divisor: 5.0,
        min_face_brightness: 60.0,
        max_face_brightness: 240.0,
        min_contrast: 8.0,
        min_skin_ratio: 0.12,
        min_eye_ratio: 0.05,
        lighting_weight: 0.3,
        contrast_weight: 0.25,
        skin_weight: 0.3,
        eye_weight: 0.15,
        detection_confidence: 0.6,
        lighting_norm: 150.0,
        contrast_norm: 50.0,
        skin_gain: 4.0,
        gaze_min_skin_quality: 0.4,
        gaze_min_eye_ratio: 0.08,
        gaze_min_lighting_quality: 0.5,
        size_min_skin_quality: 0.3,
        size_min_contrast_quality: 0.4,
        center_min_lighting_quality: 0.6,
        center_min_contrast_quality: 0.5,
    };
}

impl Default for HeuristicThresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}
