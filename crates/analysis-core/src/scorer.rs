//! Turns accumulated metrics into a scored [`AnalysisResult`].
//!
//! Scoring is a pure function of the metrics and the video duration.

use poise_analysis_model::{AnalysisResult, DimensionScore};

use crate::accumulator::RunningMetrics;
use crate::feedback::{self, Dimension, FeedbackRates};

/// Movement stability used when fewer than two movement samples exist.
const NEUTRAL_MOVEMENT_STABILITY: f64 = 0.5;

/// Intermediate numbers behind a result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub rates: FeedbackRates,
    pub movement_stability: f64,
    /// Centering score; reported but not part of the overall.
    pub centering_score: i64,
    pub eye_contact: i64,
    pub posture: i64,
    pub gestures: i64,
    pub speech: i64,
    pub overall: i64,
    pub confidence: i64,
}

impl ScoreBreakdown {
    pub fn compute(metrics: &RunningMetrics, duration_secs: f64) -> Self {
        let duration_secs = if duration_secs.is_finite() {
            duration_secs.max(0.0)
        } else {
            0.0
        };
        let rates = FeedbackRates {
            face_detection: metrics.face_detection_rate(),
            stability: metrics.stability_rate(),
            direct_gaze: metrics.direct_gaze_rate(),
            centering: metrics.centering_rate(),
            natural_gesture: metrics.natural_gesture_rate(),
            duration_secs,
        };

        let mut eye_contact = round(rates.direct_gaze * 100.0);
        let mut posture = round(rates.stability * 100.0);
        let centering_score = round(rates.centering * 100.0);

        // Poor detection makes the measured rates unreliable; damp them and
        // cap the result.
        if rates.face_detection < 0.4 {
            eye_contact = round(eye_contact as f64 * 0.4).min(25);
            posture = round(posture as f64 * 0.5).min(30);
        } else if rates.face_detection < 0.7 {
            eye_contact = round(eye_contact as f64 * 0.6).min(40);
            posture = round(posture as f64 * 0.7).min(45);
        }

        let movement_stability = movement_stability(&metrics.movement_samples);
        posture = (posture + round(movement_stability * 15.0)).min(95);

        let gestures = (50
            + round(rates.natural_gesture * 40.0)
            + round(movement_stability * 10.0))
        .clamp(35, 90);

        let speech = (55
            + round(duration_secs / 60.0 * 10.0).min(20)
            + round(rates.face_detection * 15.0))
        .clamp(45, 92);

        let overall = round((eye_contact + posture + gestures + speech) as f64 / 4.0);
        let confidence = round((eye_contact + posture + gestures) as f64 / 3.0);

        Self {
            rates,
            movement_stability,
            centering_score,
            eye_contact: eye_contact.clamp(0, 100),
            posture: posture.clamp(0, 100),
            gestures,
            speech,
            overall: overall.clamp(0, 100),
            confidence: confidence.clamp(0, 100),
        }
    }
}

/// `max(0, 1 - mean)` over movement samples, neutral below two samples.
pub fn movement_stability(samples: &[f64]) -> f64 {
    if samples.len() < 2 {
        return NEUTRAL_MOVEMENT_STABILITY;
    }
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    (1.0 - mean).max(0.0)
}

/// Score a finished run.
///
/// `source_quality_note` is an optional caller-supplied remark (for example
/// about a downscaled or partial source) placed before the closing line.
pub fn finalize(
    metrics: &RunningMetrics,
    duration_secs: f64,
    source_quality_note: Option<&str>,
) -> AnalysisResult {
    let b = ScoreBreakdown::compute(metrics, duration_secs);
    let score = |v: i64| v.clamp(0, 100) as u8;

    let eye_contact = score(b.eye_contact);
    let posture = score(b.posture);
    let gestures = score(b.gestures);
    let speech = score(b.speech);
    let confidence = score(b.confidence);
    let overall = score(b.overall);

    let mut recommendations: Vec<String> = Dimension::ACTIONABLE
        .iter()
        .zip([eye_contact, posture, gestures, speech])
        .filter_map(|(dimension, value)| dimension.recommendation(value))
        .collect();
    recommendations.extend(feedback::setup_recommendation(b.rates.face_detection));
    recommendations.extend(feedback::duration_recommendation(b.rates.duration_secs));
    if let Some(note) = source_quality_note.map(str::trim).filter(|n| !n.is_empty()) {
        recommendations.push(note.to_string());
    }
    recommendations.push(feedback::closing_line(overall));

    AnalysisResult {
        overall_score: overall,
        posture: DimensionScore::new(
            b.posture,
            feedback::posture_feedback(posture, &b.rates),
        ),
        eye_contact: DimensionScore::new(
            b.eye_contact,
            feedback::eye_contact_feedback(eye_contact, &b.rates),
        ),
        gestures: DimensionScore::new(
            b.gestures,
            feedback::gesture_feedback(gestures, &b.rates),
        ),
        speech: DimensionScore::new(b.speech, feedback::speech_feedback(speech, &b.rates)),
        confidence: DimensionScore::new(
            b.confidence,
            feedback::confidence_feedback(confidence, &b.rates),
        ),
        recommendations,
    }
}

fn round(value: f64) -> i64 {
    value.round() as i64
}
