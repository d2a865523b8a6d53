//! Landmark-based face detection.
//!
//! The landmark model itself is an external capability. This module defines
//! the seam ([`LandmarkModel`], [`LandmarkProvider`]), the detector that turns
//! keypoints into observations, and [`ReplayLandmarks`], a provider that
//! replays keypoints exported by an external face-mesh tool.

use std::path::PathBuf;

use poise_analysis_model::{
    BoundingBox, DetectorMode, FrameDims, FrameObservation, Point, RasterFrame,
};
use poise_common::error::{PoiseError, PoiseResult};
use serde::Deserialize;

use crate::detector::Detector;
use crate::thresholds::{LandmarkThresholds, EYE_LANDMARK_INDICES};

/// Keypoints for one face, in frame pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    pub keypoints: Vec<Point>,
    /// Detection box, when the model reports one.
    pub bounding_box: Option<BoundingBox>,
}

/// A loaded facial-landmark model.
pub trait LandmarkModel: Send {
    /// Find the most prominent face. `Ok(None)` when there is none.
    fn detect(&mut self, frame: &RasterFrame) -> PoiseResult<Option<LandmarkSet>>;
}

/// Optional source of a landmark model.
pub trait LandmarkProvider {
    /// Load the model. Failure downgrades the run to heuristic detection.
    fn load(&self) -> PoiseResult<Box<dyn LandmarkModel>>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}

/// Detector backed by a landmark model.
pub struct LandmarkDetector {
    model: Box<dyn LandmarkModel>,
    thresholds: LandmarkThresholds,
}

impl LandmarkDetector {
    pub fn new(model: Box<dyn LandmarkModel>) -> Self {
        Self::with_thresholds(model, LandmarkThresholds::DEFAULT)
    }

    pub fn with_thresholds(model: Box<dyn LandmarkModel>, thresholds: LandmarkThresholds) -> Self {
        Self { model, thresholds }
    }

    /// Derive an observation from keypoints without running the model.
    pub fn observation_from_landmarks(
        &self,
        landmarks: &LandmarkSet,
        dims: FrameDims,
    ) -> FrameObservation {
        let Some(face_center) = Point::centroid(&landmarks.keypoints) else {
            return FrameObservation::absent(DetectorMode::Landmark);
        };
        if dims.is_empty() {
            return FrameObservation::absent(DetectorMode::Landmark);
        }

        let t = &self.thresholds;
        let frame_center = dims.center();
        let max_distance = dims.min_side() * t.max_distance_factor;
        let distance = face_center.distance_to(&frame_center);

        let mut gaze_centered = distance < t.gaze_center_factor * max_distance;
        let centered = distance < t.centered_factor * max_distance;

        let face_box_ratio = landmarks
            .bounding_box
            .or_else(|| BoundingBox::enclosing(&landmarks.keypoints))
            .map(|bbox| bbox.area() / dims.area())
            .unwrap_or(0.0);
        let size_ok = face_box_ratio > t.min_face_box_ratio && face_box_ratio < t.max_face_box_ratio;

        let mut observation = FrameObservation::detected(DetectorMode::Landmark, face_center)
            .with_centered(centered)
            .with_size_ok(size_ok)
            .with_face_box_ratio(face_box_ratio);

        if landmarks.keypoints.len() >= t.full_mesh_keypoints {
            let eye_points: Vec<Point> = EYE_LANDMARK_INDICES
                .iter()
                .filter_map(|&i| landmarks.keypoints.get(i).copied())
                .collect();
            if let Some(eye_center) = Point::centroid(&eye_points) {
                let eye_to_center = eye_center.distance_to(&frame_center);
                if max_distance > 0.0 {
                    observation = observation.with_eye_region_ratio(eye_to_center / max_distance);
                }
                gaze_centered |= eye_to_center < t.eye_gaze_factor * max_distance;
            }
        }

        observation.with_gaze(gaze_centered)
    }
}

impl Detector for LandmarkDetector {
    fn observe(&mut self, frame: &RasterFrame) -> FrameObservation {
        match self.model.detect(frame) {
            Ok(Some(landmarks)) => self.observation_from_landmarks(&landmarks, frame.dims()),
            Ok(None) => FrameObservation::absent(DetectorMode::Landmark),
            Err(e) => {
                tracing::warn!(
                    timestamp_secs = frame.timestamp_secs,
                    error = %e,
                    "Landmark model failed on frame"
                );
                FrameObservation::absent(DetectorMode::Landmark)
            }
        }
    }

    fn mode(&self) -> DetectorMode {
        DetectorMode::Landmark
    }

    fn name(&self) -> &str {
        "landmark"
    }
}

/// One line of a landmark export.
#[derive(Debug, Clone, Deserialize)]
struct ReplayRecord {
    /// Video timestamp (seconds).
    t: f64,
    keypoints: Vec<[f64; 2]>,
    /// `[x, y, width, height]`.
    #[serde(default)]
    bbox: Option<[f64; 4]>,
    /// Coordinates are in `[0, 1]` rather than pixels.
    #[serde(default)]
    normalized: bool,
}

/// Provider that replays keypoints exported by an external face-mesh tool.
///
/// The file is JSONL, one face per line:
/// `{"t": 1.2, "keypoints": [[x, y], ...], "bbox": [x, y, w, h], "normalized": false}`.
/// Lines starting with `#` and blank lines are ignored.
#[derive(Debug, Clone)]
pub struct ReplayLandmarks {
    path: PathBuf,
    tolerance_secs: f64,
}

impl ReplayLandmarks {
    /// Match frames to records at most `tolerance_secs` away.
    pub fn new(path: impl Into<PathBuf>, tolerance_secs: f64) -> Self {
        Self {
            path: path.into(),
            tolerance_secs: tolerance_secs.max(0.0),
        }
    }
}

impl LandmarkProvider for ReplayLandmarks {
    fn load(&self) -> PoiseResult<Box<dyn LandmarkModel>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            PoiseError::detector_init(format!(
                "Cannot read landmark export {}: {e}",
                self.path.display()
            ))
        })?;
        let model = ReplayModel::parse(&content, self.tolerance_secs)?;
        tracing::info!(
            path = %self.path.display(),
            records = model.records.len(),
            "Loaded landmark export"
        );
        Ok(Box::new(model))
    }

    fn name(&self) -> &str {
        "replay"
    }
}

struct ReplayModel {
    records: Vec<ReplayRecord>,
    tolerance_secs: f64,
}

impl ReplayModel {
    fn parse(content: &str, tolerance_secs: f64) -> PoiseResult<Self> {
        let mut records = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let record: ReplayRecord = serde_json::from_str(trimmed).map_err(|e| {
                PoiseError::detector_init(format!(
                    "Malformed landmark record on line {}: {e}",
                    line_no + 1
                ))
            })?;
            records.push(record);
        }

        if records.is_empty() {
            return Err(PoiseError::detector_init("Landmark export has no records"));
        }
        records.sort_by(|a, b| a.t.total_cmp(&b.t));

        Ok(Self {
            records,
            tolerance_secs,
        })
    }

    fn nearest(&self, t: f64) -> Option<&ReplayRecord> {
        let idx = self.records.partition_point(|r| r.t < t);
        let before = idx.checked_sub(1).and_then(|i| self.records.get(i));
        let after = self.records.get(idx);
        let best = match (before, after) {
            (Some(b), Some(a)) => {
                if (t - b.t).abs() <= (a.t - t).abs() {
                    b
                } else {
                    a
                }
            }
            (Some(b), None) => b,
            (None, Some(a)) => a,
            (None, None) => return None,
        };
        ((best.t - t).abs() <= self.tolerance_secs).then_some(best)
    }
}

impl LandmarkModel for ReplayModel {
    fn detect(&mut self, frame: &RasterFrame) -> PoiseResult<Option<LandmarkSet>> {
        let Some(record) = self.nearest(frame.timestamp_secs) else {
            return Ok(None);
        };
        if record.keypoints.is_empty() {
            return Ok(None);
        }

        let dims = frame.dims();
        let (sx, sy) = if record.normalized {
            (dims.width as f64, dims.height as f64)
        } else {
            (1.0, 1.0)
        };

        Ok(Some(LandmarkSet {
            keypoints: record
                .keypoints
                .iter()
                .map(|[x, y]| Point::new(x * sx, y * sy))
                .collect(),
            bounding_box: record
                .bbox
                .map(|[x, y, w, h]| BoundingBox::new(x * sx, y * sy, w * sx, h * sy)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedModel(Option<LandmarkSet>);

    impl LandmarkModel for FixedModel {
        fn detect(&mut self, _frame: &RasterFrame) -> PoiseResult<Option<LandmarkSet>> {
            Ok(self.0.clone())
        }
    }

    struct FailingModel;

    impl LandmarkModel for FailingModel {
        fn detect(&mut self, _frame: &RasterFrame) -> PoiseResult<Option<LandmarkSet>> {
            Err(PoiseError::analysis("inference crashed"))
        }
    }

    fn square_face(cx: f64, cy: f64, half: f64) -> LandmarkSet {
        LandmarkSet {
            keypoints: vec![
                Point::new(cx - half, cy - half),
                Point::new(cx + half, cy - half),
                Point::new(cx - half, cy + half),
                Point::new(cx + half, cy + half),
            ],
            bounding_box: None,
        }
    }

    fn detector() -> LandmarkDetector {
        LandmarkDetector::new(Box::new(FixedModel(None)))
    }

    #[test]
    fn test_centered_face_of_good_size() {
        // 640x480: maxDistance = 120, frame area = 307200.
        // 240x240 box -> ratio 0.1875.
        let obs = detector().observation_from_landmarks(
            &square_face(320.0, 240.0, 120.0),
            FrameDims::new(640, 480),
        );
        assert!(obs.face_detected);
        assert!(obs.gaze_centered);
        assert!(obs.centered);
        assert!(obs.size_ok);
        assert!((obs.face_box_ratio.unwrap() - 0.1875).abs() < 1e-9);
        assert!(obs.eye_region_ratio.is_none());
    }

    #[test]
    fn test_offset_face_is_centered_but_not_gazing() {
        // 100px off center: 72 <= 100 < 120.
        let obs = detector().observation_from_landmarks(
            &square_face(420.0, 240.0, 120.0),
            FrameDims::new(640, 480),
        );
        assert!(obs.face_detected);
        assert!(!obs.gaze_centered);
        assert!(obs.centered);
    }

    #[test]
    fn test_far_face_is_neither_centered_nor_gazing() {
        let obs = detector().observation_from_landmarks(
            &square_face(560.0, 240.0, 40.0),
            FrameDims::new(640, 480),
        );
        assert!(obs.face_detected);
        assert!(!obs.gaze_centered);
        assert!(!obs.centered);
        // 80x80 box is too small.
        assert!(!obs.size_ok);
    }

    #[test]
    fn test_face_size_window_is_exclusive() {
        let d = detector();
        let dims = FrameDims::new(100, 100);
        let mut set = square_face(50.0, 50.0, 10.0);
        set.bounding_box = Some(BoundingBox::new(0.0, 0.0, 40.0, 20.0));
        assert!(!d.observation_from_landmarks(&set, dims).size_ok);
        set.bounding_box = Some(BoundingBox::new(0.0, 0.0, 40.0, 20.1));
        assert!(d.observation_from_landmarks(&set, dims).size_ok);
        set.bounding_box = Some(BoundingBox::new(0.0, 0.0, 40.0, 100.0));
        assert!(!d.observation_from_landmarks(&set, dims).size_ok);
    }

    #[test]
    fn test_full_mesh_eye_region_reinforces_gaze() {
        // Face centroid sits 80px right of center (outside 0.6 * 120 = 72),
        // but the eye landmarks sit at the frame center.
        let dims = FrameDims::new(640, 480);
        let mut keypoints = vec![Point::new(420.0, 240.0); 468];
        for &i in EYE_LANDMARK_INDICES.iter() {
            keypoints[i] = Point::new(320.0, 240.0);
        }
        let set = LandmarkSet {
            keypoints,
            bounding_box: Some(BoundingBox::new(300.0, 140.0, 240.0, 240.0)),
        };
        let obs = detector().observation_from_landmarks(&set, dims);
        let center = obs.face_center.unwrap();
        assert!(center.distance_to(&dims.center()) > 72.0);
        assert!(obs.gaze_centered);
        assert!(obs.eye_region_ratio.unwrap() < 1e-9);
    }

    #[test]
    fn test_model_errors_become_absent_observations() {
        let mut d = LandmarkDetector::new(Box::new(FailingModel));
        let obs = d.observe(&RasterFrame::solid(0.0, 64, 64, [0, 0, 0]));
        assert!(!obs.face_detected);
        assert_eq!(obs.mode, DetectorMode::Landmark);
    }

    #[test]
    fn test_replay_matches_nearest_record_within_tolerance() {
        let content = "# exported by facemesh\n\
            {\"t\": 0.0, \"keypoints\": [[0.5, 0.5]], \"normalized\": true}\n\
            \n\
            {\"t\": 0.6, \"keypoints\": [[10, 20], [30, 40]]}\n";
        let mut model = ReplayModel::parse(content, 0.15).unwrap();

        let hit = model
            .detect(&RasterFrame::solid(0.05, 200, 100, [0, 0, 0]))
            .unwrap()
            .unwrap();
        assert_eq!(hit.keypoints, vec![Point::new(100.0, 50.0)]);

        let hit = model
            .detect(&RasterFrame::solid(0.55, 200, 100, [0, 0, 0]))
            .unwrap()
            .unwrap();
        assert_eq!(hit.keypoints.len(), 2);

        let miss = model
            .detect(&RasterFrame::solid(0.3, 200, 100, [0, 0, 0]))
            .unwrap();
        assert!(miss.is_none());
    }

    #[test]
    fn test_replay_rejects_malformed_or_empty_exports() {
        assert!(matches!(
            ReplayModel::parse("{\"t\": 0.0}", 0.1),
            Err(PoiseError::DetectorInit { .. })
        ));
        assert!(matches!(
            ReplayModel::parse("# nothing\n", 0.1),
            Err(PoiseError::DetectorInit { .. })
        ));
        let provider = ReplayLandmarks::new("/no/such/export.jsonl", 0.1);
        assert!(matches!(
            provider.load(),
            Err(PoiseError::DetectorInit { .. })
        ));
    }
}
