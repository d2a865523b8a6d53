//! Fixed result returned when a run cannot measure anything.

use poise_analysis_model::{AnalysisResult, DimensionScore};
use poise_common::error::FailureKind;

pub const FALLBACK_OVERALL: u8 = 65;
pub const FALLBACK_POSTURE: u8 = 60;
pub const FALLBACK_EYE_CONTACT: u8 = 70;
pub const FALLBACK_GESTURES: u8 = 65;
pub const FALLBACK_SPEECH: u8 = 65;
pub const FALLBACK_CONFIDENCE: u8 = 65;

/// Conservative default result with advice tailored to `kind`.
pub fn fallback_result(kind: FailureKind) -> AnalysisResult {
    let mut recommendations: Vec<String> = match kind {
        FailureKind::Format => vec![
            "The video format could not be decoded. Export the recording as MP4 (H.264) or WebM and try again.",
            "Check that the file plays in a regular media player before uploading it.",
        ],
        FailureKind::Timeout => vec![
            "The video took too long to open. Try a shorter recording or a smaller file size.",
            "Make sure the recording has finished saving before starting the analysis.",
        ],
        FailureKind::Cancelled => vec![
            "The analysis was cancelled before any frame was processed. Run it again to get a score.",
        ],
        FailureKind::Unknown => vec![
            "The analysis could not be completed. Try recording again.",
        ],
    }
    .into_iter()
    .map(String::from)
    .collect();

    recommendations.push(
        "Ensure good lighting on your face and keep it centered in the frame.".to_string(),
    );
    recommendations.push("Record again to get personalized feedback.".to_string());

    AnalysisResult {
        overall_score: FALLBACK_OVERALL,
        posture: DimensionScore::new(
            FALLBACK_POSTURE as i64,
            "Critical: posture could not be measured. Sit upright and keep your whole face in view.",
        ),
        eye_contact: DimensionScore::new(
            FALLBACK_EYE_CONTACT as i64,
            "Critical: ensure good lighting and look directly at the camera so eye contact can be measured.",
        ),
        gestures: DimensionScore::new(
            FALLBACK_GESTURES as i64,
            "Gestures could not be measured for this recording.",
        ),
        speech: DimensionScore::new(
            FALLBACK_SPEECH as i64,
            "Speech delivery could not be measured for this recording.",
        ),
        confidence: DimensionScore::new(
            FALLBACK_CONFIDENCE as i64,
            "Confidence could not be measured for this recording.",
        ),
        recommendations,
    }
}
