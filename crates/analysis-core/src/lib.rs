//! Poise Analysis Core
//!
//! Scores on-camera delivery from sampled video frames:
//! - **Detectors:** landmark-model and pixel-heuristic face observation
//! - **Accumulator:** running counters and movement deltas, in time order
//! - **Scorer:** deterministic scores, feedback text and recommendations
//! - **Orchestrator:** the sequential sampling loop with timeout, cancellation
//!   and the fixed fallback result
//!
//! Apart from the orchestrator's await points everything here is pure
//! computation over frames and observations.

pub mod accumulator;
pub mod detector;
pub mod fallback;
pub mod feedback;
pub mod heuristic;
pub mod landmark;
pub mod orchestrator;
pub mod scorer;
pub mod thresholds;

pub use accumulator::{MetricAccumulator, RunningMetrics};
pub use detector::{select_detector, Detector};
pub use fallback::fallback_result;
pub use heuristic::HeuristicDetector;
pub use landmark::{
    LandmarkDetector, LandmarkModel, LandmarkProvider, LandmarkSet, ReplayLandmarks,
};
pub use orchestrator::{AnalysisOrchestrator, AnalysisState, CancelHandle, OrchestratorConfig};
pub use scorer::{finalize, ScoreBreakdown};
