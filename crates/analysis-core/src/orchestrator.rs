//! The sampling loop: metadata, then `frame_at -> observe -> update` at a
//! fixed step, then scoring.
//!
//! The loop is strictly sequential. Movement deltas depend on temporal
//! adjacency, so a frame is never requested before the previous one has been
//! observed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use poise_analysis_model::{
    AnalysisOutcome, AnalysisStatus, DetectorMode, FrameObservation,
};
use poise_common::clock::{RunClock, SampleClock};
use poise_common::config::AnalysisDefaults;
use poise_common::error::{FailureKind, PoiseError};
use poise_media::FrameSource;

use crate::accumulator::MetricAccumulator;
use crate::detector::{select_detector, Detector};
use crate::fallback::fallback_result;
use crate::landmark::LandmarkProvider;
use crate::scorer;

/// Emit a progress line every this many samples.
const PROGRESS_LOG_INTERVAL: u64 = 50;

/// Tunables for one orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Seconds between sampled frames.
    pub sample_step_secs: f64,
    /// Hard bound on waiting for video metadata.
    pub metadata_timeout: Duration,
    /// Pause between steps. Zero still yields to the scheduler.
    pub yield_pause: Duration,
    /// Use the landmark detector when a provider is available.
    pub prefer_landmarks: bool,
}

impl From<&AnalysisDefaults> for OrchestratorConfig {
    fn from(defaults: &AnalysisDefaults) -> Self {
        Self {
            sample_step_secs: defaults.sample_step_secs,
            metadata_timeout: defaults.metadata_timeout(),
            yield_pause: defaults.yield_pause(),
            prefer_landmarks: defaults.prefer_landmarks,
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::from(&AnalysisDefaults::default())
    }
}

/// Shared flag for best-effort cancellation between steps.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clear the flag so the orchestrator can be reused.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Orchestrator lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    Idle,
    Sampling,
    Finalizing,
    Failed,
}

/// Drives one analysis at a time over a [`FrameSource`].
pub struct AnalysisOrchestrator {
    config: OrchestratorConfig,
    detector: Box<dyn Detector>,
    cancel: CancelHandle,
    state: AnalysisState,
}

impl AnalysisOrchestrator {
    /// Build with detector selection. A missing or failing landmark provider
    /// falls back to the heuristic detector for the lifetime of the
    /// orchestrator.
    pub fn new(config: OrchestratorConfig, provider: Option<&dyn LandmarkProvider>) -> Self {
        let detector = select_detector(provider, config.prefer_landmarks);
        Self::with_detector(config, detector)
    }

    pub fn with_detector(config: OrchestratorConfig, detector: Box<dyn Detector>) -> Self {
        Self {
            config,
            detector,
            cancel: CancelHandle::new(),
            state: AnalysisState::Idle,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn state(&self) -> AnalysisState {
        self.state
    }

    pub fn detector_mode(&self) -> DetectorMode {
        self.detector.mode()
    }

    /// Analyze a video. Never returns an error: failures produce the
    /// fallback result with [`AnalysisStatus::Failed`].
    pub async fn run(&mut self, source: &mut dyn FrameSource) -> AnalysisOutcome {
        let clock = RunClock::start();
        let mode = self.detector.mode();
        self.state = AnalysisState::Sampling;

        tracing::info!(
            source = source.name(),
            detector = self.detector.name(),
            step_secs = self.config.sample_step_secs,
            started = clock.started_wall(),
            "Starting analysis"
        );

        let step = self.config.sample_step_secs;
        if !step.is_finite() || step <= 0.0 {
            let e = PoiseError::config(format!("Sampling step must be positive, got {step}"));
            return self.fail(&e, 0, 0.0, &clock);
        }

        let timeout = self.config.metadata_timeout;
        let meta = match tokio::time::timeout(timeout, source.metadata()).await {
            Ok(Ok(meta)) => meta,
            Ok(Err(e)) => return self.fail(&e, 0, 0.0, &clock),
            Err(_) => {
                let e = PoiseError::MetadataTimeout {
                    secs: timeout.as_secs_f64(),
                };
                return self.fail(&e, 0, 0.0, &clock);
            }
        };

        if !meta.duration_secs.is_finite() || meta.duration_secs <= 0.0 {
            let e = PoiseError::decode(format!(
                "Video reports an unusable duration ({})",
                meta.duration_secs
            ));
            return self.fail(&e, 0, 0.0, &clock);
        }

        let schedule = SampleClock::new(self.config.sample_step_secs, meta.duration_secs);
        let expected = schedule.expected_samples();
        let mut accumulator = MetricAccumulator::new(mode);
        let mut skipped = 0u64;
        let mut cancelled = false;

        for t in schedule.iter() {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            match source.frame_at(t).await {
                Ok(frame) => {
                    let obs = self.detector.observe(&frame);
                    accumulator.update(&obs);
                }
                Err(e) if e.is_frame_local() => {
                    tracing::warn!(timestamp_secs = t, error = %e, "Skipping undecodable frame");
                    skipped += 1;
                    accumulator.update(&FrameObservation::absent(mode));
                }
                Err(e) => {
                    let frames = accumulator.metrics().frame_count;
                    let unexpected = PoiseError::analysis(e.to_string());
                    return self.fail(&unexpected, frames, meta.duration_secs, &clock);
                }
            }

            let done = accumulator.metrics().frame_count;
            if done % PROGRESS_LOG_INTERVAL == 0 {
                tracing::debug!(
                    samples = done,
                    expected,
                    faces = accumulator.metrics().face_detected_frames,
                    "Sampling progress"
                );
            }

            pause(self.config.yield_pause).await;
        }

        let metrics = accumulator.into_metrics();
        if cancelled && metrics.frame_count == 0 {
            let status = AnalysisStatus::Failed(FailureKind::Cancelled);
            self.state = AnalysisState::Failed;
            tracing::warn!("Analysis cancelled before any frame was processed");
            return AnalysisOutcome {
                result: fallback_result(FailureKind::Cancelled),
                status,
                frames_sampled: 0,
                face_detection_rate: 0.0,
                duration_secs: meta.duration_secs,
                detector_mode: mode,
                elapsed_secs: clock.elapsed_secs(),
            };
        }

        self.state = AnalysisState::Finalizing;
        let note = if cancelled {
            Some(format!(
                "Analysis was stopped early: {} of {} samples were analyzed.",
                metrics.frame_count, expected
            ))
        } else if skipped > 0 {
            Some(format!(
                "{skipped} of {} sampled frames could not be decoded; re-exporting the video may improve accuracy.",
                metrics.frame_count
            ))
        } else {
            None
        };

        let result = scorer::finalize(&metrics, meta.duration_secs, note.as_deref());
        let status = if cancelled {
            AnalysisStatus::Partial
        } else {
            AnalysisStatus::Completed
        };

        let outcome = AnalysisOutcome {
            result,
            status,
            frames_sampled: metrics.frame_count,
            face_detection_rate: metrics.face_detection_rate(),
            duration_secs: meta.duration_secs,
            detector_mode: mode,
            elapsed_secs: clock.elapsed_secs(),
        };

        tracing::info!(
            overall = outcome.result.overall_score,
            frames = outcome.frames_sampled,
            skipped,
            face_detection_rate = outcome.face_detection_rate,
            partial = cancelled,
            elapsed_secs = outcome.elapsed_secs,
            "Analysis finished"
        );

        outcome
    }

    fn fail(
        &mut self,
        error: &PoiseError,
        frames_sampled: u64,
        duration_secs: f64,
        clock: &RunClock,
    ) -> AnalysisOutcome {
        let kind = error.failure_kind();
        self.state = AnalysisState::Failed;
        tracing::error!(error = %error, kind = ?kind, "Analysis failed, returning fallback result");

        AnalysisOutcome {
            result: fallback_result(kind),
            status: AnalysisStatus::Failed(kind),
            frames_sampled,
            face_detection_rate: 0.0,
            duration_secs,
            detector_mode: self.detector.mode(),
            elapsed_secs: clock.elapsed_secs(),
        }
    }
}

async fn pause(duration: Duration) {
    if duration.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(duration).await;
    }
}
