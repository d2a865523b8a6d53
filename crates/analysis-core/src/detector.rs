//! Detector capability and construction-time selection.

use poise_analysis_model::{DetectorMode, FrameObservation, RasterFrame};

use crate::heuristic::HeuristicDetector;
use crate::landmark::{LandmarkDetector, LandmarkProvider};

/// Turns one decoded frame into one observation.
///
/// A missing face is not an error: implementations return
/// [`FrameObservation::absent`].
pub trait Detector: Send {
    /// Inspect a frame. Dimensions are taken from the frame itself.
    fn observe(&mut self, frame: &RasterFrame) -> FrameObservation;

    /// Mode used to pick movement thresholds downstream.
    fn mode(&self) -> DetectorMode;

    /// Detector name for logging.
    fn name(&self) -> &str;
}

/// Pick the detector for a whole run.
///
/// The landmark detector is used when a provider is present, preferred, and
/// loads successfully. Any other case falls back to the heuristic detector
/// for the remainder of the run.
pub fn select_detector(
    provider: Option<&dyn LandmarkProvider>,
    prefer_landmarks: bool,
) -> Box<dyn Detector> {
    let Some(provider) = provider.filter(|_| prefer_landmarks) else {
        tracing::debug!("Landmark detection not requested, using heuristic detector");
        return Box::new(HeuristicDetector::new());
    };

    match provider.load() {
        Ok(model) => {
            tracing::info!(provider = provider.name(), "Using landmark detector");
            Box::new(LandmarkDetector::new(model))
        }
        Err(e) => {
            tracing::warn!(
                provider = provider.name(),
                error = %e,
                "Landmark detector unavailable, falling back to heuristic detector"
            );
            Box::new(HeuristicDetector::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{LandmarkModel, LandmarkSet};
    use poise_common::error::{PoiseError, PoiseResult};

    struct NoFaceModel;

    impl LandmarkModel for NoFaceModel {
        fn detect(&mut self, _frame: &RasterFrame) -> PoiseResult<Option<LandmarkSet>> {
            Ok(None)
        }
    }

    struct WorkingProvider;

    impl LandmarkProvider for WorkingProvider {
        fn load(&self) -> PoiseResult<Box<dyn LandmarkModel>> {
            Ok(Box::new(NoFaceModel))
        }

        fn name(&self) -> &str {
            "working"
        }
    }

    struct BrokenProvider;

    impl LandmarkProvider for BrokenProvider {
        fn load(&self) -> PoiseResult<Box<dyn LandmarkModel>> {
            Err(PoiseError::detector_init("model weights missing"))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[test]
    fn test_no_provider_means_heuristic() {
        assert_eq!(select_detector(None, true).mode(), DetectorMode::Heuristic);
    }

    #[test]
    fn test_working_provider_means_landmark() {
        let detector = select_detector(Some(&WorkingProvider), true);
        assert_eq!(detector.mode(), DetectorMode::Landmark);
    }

    #[test]
    fn test_failed_load_downgrades_to_heuristic() {
        let detector = select_detector(Some(&BrokenProvider), true);
        assert_eq!(detector.mode(), DetectorMode::Heuristic);
    }

    #[test]
    fn test_provider_ignored_when_not_preferred() {
        let detector = select_detector(Some(&WorkingProvider), false);
        assert_eq!(detector.mode(), DetectorMode::Heuristic);
    }
}
