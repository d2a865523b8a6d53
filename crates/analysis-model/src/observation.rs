//! Per-frame detector output.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Which detector produced an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorMode {
    /// Facial-landmark model.
    Landmark,
    /// Pixel color/brightness heuristics.
    Heuristic,
}

impl DetectorMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DetectorMode::Landmark => "landmark",
            DetectorMode::Heuristic => "heuristic",
        }
    }
}

/// What a detector saw in a single sampled frame.
///
/// An absent face is `face_detected == false` with every optional field
/// empty and every flag cleared.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameObservation {
    /// Detector that produced this observation.
    pub mode: DetectorMode,

    /// A face was judged present.
    pub face_detected: bool,

    /// Estimated face center (pixels).
    pub face_center: Option<Point>,

    /// Face bounding-box area over frame area.
    pub face_box_ratio: Option<f64>,

    /// Gaze judged to be directed at the camera.
    pub gaze_centered: bool,

    /// Eye-region signal. Landmark mode: normalized eye-centroid distance
    /// from frame center. Heuristic mode: upper-half share of the face region.
    pub eye_region_ratio: Option<f64>,

    /// Face is well centered in the frame.
    pub centered: bool,

    /// Face size / signal quality is good enough to anchor movement deltas.
    pub size_ok: bool,
}

impl FrameObservation {
    /// Observation for a frame without a detectable face.
    pub fn absent(mode: DetectorMode) -> Self {
        Self {
            mode,
            face_detected: false,
            face_center: None,
            face_box_ratio: None,
            gaze_centered: false,
            eye_region_ratio: None,
            centered: false,
            size_ok: false,
        }
    }

    /// Observation for a detected face at `center`, flags cleared.
    pub fn detected(mode: DetectorMode, center: Point) -> Self {
        Self {
            face_detected: true,
            face_center: Some(center),
            ..Self::absent(mode)
        }
    }

    pub fn with_gaze(mut self, gaze_centered: bool) -> Self {
        self.gaze_centered = gaze_centered;
        self
    }

    pub fn with_centered(mut self, centered: bool) -> Self {
        self.centered = centered;
        self
    }

    pub fn with_size_ok(mut self, size_ok: bool) -> Self {
        self.size_ok = size_ok;
        self
    }

    pub fn with_face_box_ratio(mut self, ratio: f64) -> Self {
        self.face_box_ratio = Some(ratio);
        self
    }

    pub fn with_eye_region_ratio(mut self, ratio: f64) -> Self {
        self.eye_region_ratio = Some(ratio);
        self
    }
}
