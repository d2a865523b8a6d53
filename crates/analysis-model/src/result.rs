//! Scored analysis results and history records.

use poise_common::error::FailureKind;
use serde::{Deserialize, Serialize};

use crate::observation::DetectorMode;

/// Score and explanation for one behavioral dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionScore {
    /// Score in `[0, 100]`.
    pub score: u8,
    /// Human-readable feedback for this score band.
    pub feedback: String,
}

impl DimensionScore {
    /// Build a dimension score, clamping into `[0, 100]`.
    pub fn new(score: i64, feedback: impl Into<String>) -> Self {
        Self {
            score: score.clamp(0, 100) as u8,
            feedback: feedback.into(),
        }
    }
}

/// Final output of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Overall score in `[0, 100]`.
    pub overall_score: u8,
    pub posture: DimensionScore,
    pub eye_contact: DimensionScore,
    pub gestures: DimensionScore,
    pub speech: DimensionScore,
    pub confidence: DimensionScore,
    /// Actionable advice, most specific first, closing guidance last.
    pub recommendations: Vec<String>,
}

impl AnalysisResult {
    /// The five dimensions with their display names.
    pub fn dimensions(&self) -> [(&'static str, &DimensionScore); 5] {
        [
            ("posture", &self.posture),
            ("eye contact", &self.eye_contact),
            ("gestures", &self.gestures),
            ("speech", &self.speech),
            ("confidence", &self.confidence),
        ]
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// Every scheduled sample was processed.
    Completed,
    /// Cancelled after at least one frame; scores reflect the processed prefix.
    Partial,
    /// Fixed fallback scores; nothing was measured.
    Failed(FailureKind),
}

/// A result plus the run facts needed by callers and the history sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    pub status: AnalysisStatus,
    /// Frames pushed through the detector (including skipped decodes).
    pub frames_sampled: u64,
    /// Fraction of sampled frames with a detected face.
    pub face_detection_rate: f64,
    /// Video duration (seconds); zero when metadata never loaded.
    pub duration_secs: f64,
    /// Detector used for the run.
    pub detector_mode: DetectorMode,
    /// Wall-clock time spent on the run.
    pub elapsed_secs: f64,
}

impl AnalysisOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, AnalysisStatus::Failed(_))
    }

    /// History record for measured runs. Fallback results are not recorded.
    pub fn history_record(&self, date: impl Into<String>) -> Option<HistoryRecord> {
        if self.is_failed() {
            return None;
        }
        Some(HistoryRecord {
            date: date.into(),
            overall_score: self.result.overall_score,
            posture_score: self.result.posture.score,
            eye_contact_score: self.result.eye_contact.score,
            gesture_score: self.result.gestures.score,
            speech_score: self.result.speech.score,
            duration_seconds: self.duration_secs,
            face_detection_rate_percent: (self.face_detection_rate * 100.0)
                .round()
                .clamp(0.0, 100.0) as u8,
        })
    }
}

/// One appended line in the history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// Completion time (ISO 8601).
    pub date: String,
    pub overall_score: u8,
    pub posture_score: u8,
    pub eye_contact_score: u8,
    pub gesture_score: u8,
    pub speech_score: u8,
    pub duration_seconds: f64,
    pub face_detection_rate_percent: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            overall_score: 72,
            posture: DimensionScore::new(80, "good"),
            eye_contact: DimensionScore::new(70, "ok"),
            gestures: DimensionScore::new(60, "fair"),
            speech: DimensionScore::new(78, "good"),
            confidence: DimensionScore::new(70, "ok"),
            recommendations: vec!["keep going".to_string()],
        }
    }

    fn outcome(status: AnalysisStatus) -> AnalysisOutcome {
        AnalysisOutcome {
            result: sample_result(),
            status,
            frames_sampled: 200,
            face_detection_rate: 0.876,
            duration_secs: 60.0,
            detector_mode: DetectorMode::Heuristic,
            elapsed_secs: 3.2,
        }
    }

    #[test]
    fn test_dimension_score_is_clamped() {
        assert_eq!(DimensionScore::new(140, "").score, 100);
        assert_eq!(DimensionScore::new(-5, "").score, 0);
    }

    #[test]
    fn test_history_record_uses_camel_case_keys() {
        let record = outcome(AnalysisStatus::Completed)
            .history_record("2026-01-01T00:00:00Z")
            .unwrap();
        assert_eq!(record.face_detection_rate_percent, 88);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"eyeContactScore\":70"));
        assert!(json.contains("\"faceDetectionRatePercent\":88"));
        assert!(json.contains("\"durationSeconds\":60.0"));
    }

    #[test]
    fn test_failed_outcomes_are_not_recorded() {
        assert!(outcome(AnalysisStatus::Failed(FailureKind::Timeout))
            .history_record("2026-01-01T00:00:00Z")
            .is_none());
        assert!(outcome(AnalysisStatus::Partial)
            .history_record("2026-01-01T00:00:00Z")
            .is_some());
    }

    #[test]
    fn test_status_serializes_with_reason() {
        let json = serde_json::to_string(&AnalysisStatus::Failed(FailureKind::Format)).unwrap();
        assert_eq!(json, r#"{"status":"failed","reason":"format"}"#);
        let json = serde_json::to_string(&AnalysisStatus::Completed).unwrap();
        assert_eq!(json, r#"{"status":"completed"}"#);
    }
}
