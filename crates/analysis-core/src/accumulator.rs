//! Running per-run counters fed by one observation at a time.

use poise_analysis_model::{DetectorMode, FrameObservation, Point};
use serde::{Deserialize, Serialize};

use crate::thresholds::MovementThresholds;

/// Counters for one analysis run.
///
/// Every face-derived counter is a subset of `face_detected_frames`, which is
/// itself a subset of `frame_count`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningMetrics {
    pub frame_count: u64,
    pub face_detected_frames: u64,
    pub center_face_frames: u64,
    pub stable_posture_frames: u64,
    pub direct_gaze_frames: u64,
    pub natural_gesture_frames: u64,
    /// Face-center displacement between consecutive eligible frames (pixels).
    pub movement_samples: Vec<f64>,
    /// Last face center that passed the size/quality check.
    pub previous_face_center: Option<Point>,
}

impl RunningMetrics {
    /// `count / frame_count`, or 0 for an empty run.
    pub fn rate(&self, count: u64) -> f64 {
        if self.frame_count == 0 {
            0.0
        } else {
            count as f64 / self.frame_count as f64
        }
    }

    pub fn face_detection_rate(&self) -> f64 {
        self.rate(self.face_detected_frames)
    }

    pub fn stability_rate(&self) -> f64 {
        self.rate(self.stable_posture_frames)
    }

    pub fn direct_gaze_rate(&self) -> f64 {
        self.rate(self.direct_gaze_frames)
    }

    pub fn centering_rate(&self) -> f64 {
        self.rate(self.center_face_frames)
    }

    pub fn natural_gesture_rate(&self) -> f64 {
        self.rate(self.natural_gesture_frames)
    }
}

/// Folds observations into [`RunningMetrics`] in time order.
#[derive(Debug, Clone)]
pub struct MetricAccumulator {
    metrics: RunningMetrics,
    thresholds: MovementThresholds,
}

impl MetricAccumulator {
    pub fn new(mode: DetectorMode) -> Self {
        Self::with_thresholds(MovementThresholds::for_mode(mode))
    }

    pub fn with_thresholds(thresholds: MovementThresholds) -> Self {
        Self {
            metrics: RunningMetrics::default(),
            thresholds,
        }
    }

    pub fn update(&mut self, obs: &FrameObservation) {
        let m = &mut self.metrics;
        m.frame_count += 1;

        if !obs.face_detected {
            return;
        }

        m.face_detected_frames += 1;
        if obs.centered {
            m.center_face_frames += 1;
        }
        if obs.gaze_centered {
            m.direct_gaze_frames += 1;
        }

        let Some(center) = obs.face_center else {
            return;
        };

        if let Some(previous) = m.previous_face_center {
            let movement = center.distance_to(&previous);
            m.movement_samples.push(movement);
            if self.thresholds.is_stable(movement) {
                m.stable_posture_frames += 1;
            }
            if self.thresholds.is_natural_gesture(movement) {
                m.natural_gesture_frames += 1;
            }
        }

        if obs.size_ok {
            m.previous_face_center = Some(center);
        }
    }

    pub fn metrics(&self) -> &RunningMetrics {
        &self.metrics
    }

    pub fn into_metrics(self) -> RunningMetrics {
        self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_at(mode: DetectorMode, x: f64) -> FrameObservation {
        FrameObservation::detected(mode, Point::new(x, 100.0))
            .with_size_ok(true)
            .with_centered(true)
            .with_gaze(true)
    }

    #[test]
    fn test_absent_frames_only_bump_frame_count() {
        let mut acc = MetricAccumulator::new(DetectorMode::Heuristic);
        for _ in 0..5 {
            acc.update(&FrameObservation::absent(DetectorMode::Heuristic));
        }
        let m = acc.metrics();
        assert_eq!(m.frame_count, 5);
        assert_eq!(m.face_detected_frames, 0);
        assert!(m.movement_samples.is_empty());
        assert_eq!(m.face_detection_rate(), 0.0);
    }

    #[test]
    fn test_empty_run_rates_are_zero() {
        let m = RunningMetrics::default();
        assert_eq!(m.face_detection_rate(), 0.0);
        assert_eq!(m.stability_rate(), 0.0);
        assert_eq!(m.direct_gaze_rate(), 0.0);
    }

    #[test]
    fn test_first_detection_has_no_movement_sample() {
        let mut acc = MetricAccumulator::new(DetectorMode::Landmark);
        acc.update(&face_at(DetectorMode::Landmark, 10.0));
        assert!(acc.metrics().movement_samples.is_empty());
        acc.update(&face_at(DetectorMode::Landmark, 13.0));
        assert_eq!(acc.metrics().movement_samples, vec![3.0]);
        assert_eq!(acc.metrics().stable_posture_frames, 1);
    }

    #[test]
    fn test_heuristic_delta_of_twenty_is_gesture_not_stable() {
        let mut acc = MetricAccumulator::new(DetectorMode::Heuristic);
        acc.update(&face_at(DetectorMode::Heuristic, 0.0));
        acc.update(&face_at(DetectorMode::Heuristic, 20.0));
        let m = acc.metrics();
        assert_eq!(m.natural_gesture_frames, 1);
        assert_eq!(m.stable_posture_frames, 0);

        // Delta of exactly 30 is outside the gesture band.
        acc.update(&face_at(DetectorMode::Heuristic, 50.0));
        assert_eq!(acc.metrics().natural_gesture_frames, 1);
        assert_eq!(acc.metrics().stable_posture_frames, 0);

        acc.update(&face_at(DetectorMode::Heuristic, 79.5));
        assert_eq!(acc.metrics().natural_gesture_frames, 2);
    }

    #[test]
    fn test_landmark_small_delta_counts_as_both() {
        let mut acc = MetricAccumulator::new(DetectorMode::Landmark);
        acc.update(&face_at(DetectorMode::Landmark, 0.0));
        acc.update(&face_at(DetectorMode::Landmark, 10.0));
        let m = acc.metrics();
        assert_eq!(m.stable_posture_frames, 1);
        assert_eq!(m.natural_gesture_frames, 1);
    }

    #[test]
    fn test_previous_center_only_moves_on_size_ok() {
        let mut acc = MetricAccumulator::new(DetectorMode::Heuristic);
        acc.update(&face_at(DetectorMode::Heuristic, 0.0));
        let small = FrameObservation::detected(DetectorMode::Heuristic, Point::new(50.0, 100.0));
        acc.update(&small);
        assert_eq!(
            acc.metrics().previous_face_center,
            Some(Point::new(0.0, 100.0))
        );
        acc.update(&face_at(DetectorMode::Heuristic, 5.0));
        assert_eq!(acc.metrics().movement_samples, vec![50.0, 5.0]);
    }

    #[test]
    fn test_subset_counts_hold() {
        let mut acc = MetricAccumulator::new(DetectorMode::Heuristic);
        for i in 0..30 {
            if i % 3 == 0 {
                acc.update(&FrameObservation::absent(DetectorMode::Heuristic));
            } else {
                acc.update(&face_at(DetectorMode::Heuristic, (i * 7 % 40) as f64));
            }
        }
        let m = acc.into_metrics();
        assert!(m.frame_count >= m.face_detected_frames);
        assert!(m.face_detected_frames >= m.center_face_frames);
        assert!(m.face_detected_frames >= m.stable_posture_frames);
        assert!(m.face_detected_frames >= m.direct_gaze_frames);
        assert_eq!(
            m.movement_samples.len() as u64,
            m.face_detected_frames - 1
        );
    }
}
