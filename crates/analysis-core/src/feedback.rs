//! Feedback and recommendation text.
//!
//! Every string is chosen from a fixed table by score band, so identical
//! metrics always produce identical text.

/// Score bands used to pick feedback text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Excellent,
    Good,
    Fair,
    Critical,
}

/// One scored dimension of the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    EyeContact,
    Posture,
    Gestures,
    Speech,
    Confidence,
}

/// Dimensions below this score get a recommendation.
pub const RECOMMENDATION_THRESHOLD: u8 = 75;

impl Dimension {
    /// Dimensions that produce recommendations, in output order.
    pub const ACTIONABLE: [Dimension; 4] = [
        Dimension::EyeContact,
        Dimension::Posture,
        Dimension::Gestures,
        Dimension::Speech,
    ];

    /// Label that prefixes this dimension's recommendations.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::EyeContact => "Eye contact",
            Dimension::Posture => "Posture",
            Dimension::Gestures => "Gestures",
            Dimension::Speech => "Speech",
            Dimension::Confidence => "Confidence",
        }
    }

    /// Band boundaries `(excellent, good, fair)`; eye contact uses a wider
    /// top band.
    fn cutoffs(self) -> (u8, u8, u8) {
        match self {
            Dimension::EyeContact => (85, 65, 45),
            _ => (80, 65, 50),
        }
    }

    pub fn band(self, score: u8) -> Band {
        let (excellent, good, fair) = self.cutoffs();
        if score >= excellent {
            Band::Excellent
        } else if score >= good {
            Band::Good
        } else if score >= fair {
            Band::Fair
        } else {
            Band::Critical
        }
    }

    /// Recommendation for a score, or `None` when nothing needs work.
    /// Confidence is derived from the other dimensions and never gets one.
    pub fn recommendation(self, score: u8) -> Option<String> {
        if score >= RECOMMENDATION_THRESHOLD {
            return None;
        }
        let critical = self.band(score) == Band::Critical;
        let advice = match (self, critical) {
            (Dimension::EyeContact, false) => {
                "Look into the lens rather than at your own image; glance away only briefly."
            }
            (Dimension::EyeContact, true) => {
                "You rarely looked at the camera. Place your notes next to the lens and practice holding its gaze for whole sentences."
            }
            (Dimension::Posture, false) => {
                "Sit or stand tall and keep your head level; avoid drifting toward the edges of the frame."
            }
            (Dimension::Posture, true) => {
                "Your position was rarely steady. Set the camera at eye level, center yourself, and plant your feet before you start."
            }
            (Dimension::Gestures, false) => {
                "Add purposeful hand and head movement to underline key points."
            }
            (Dimension::Gestures, true) => {
                "Movement looked either frozen or restless. Aim for calm, deliberate gestures between still moments."
            }
            (Dimension::Speech, false) => {
                "Record a little longer and stay in view so your delivery can be judged in full."
            }
            (Dimension::Speech, true) => {
                "There was too little usable footage to judge your delivery. Record at least a minute while facing the camera."
            }
            (Dimension::Confidence, _) => return None,
        };
        let label = if critical {
            format!("{} (critical)", self.label())
        } else {
            self.label().to_string()
        };
        Some(format!("{label}: {advice}"))
    }
}

/// Rates shown inside feedback strings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackRates {
    pub face_detection: f64,
    pub stability: f64,
    pub direct_gaze: f64,
    pub centering: f64,
    pub natural_gesture: f64,
    pub duration_secs: f64,
}

pub fn eye_contact_feedback(score: u8, rates: &FeedbackRates) -> String {
    let gaze = percent(rates.direct_gaze);
    match Dimension::EyeContact.band(score) {
        Band::Excellent => {
            format!("Excellent eye contact; you held the camera's gaze consistently (direct gaze: {gaze}%).")
        }
        Band::Good => {
            format!("Good eye contact with occasional lapses (direct gaze: {gaze}%).")
        }
        Band::Fair => {
            format!("Eye contact was inconsistent; you often looked away from the lens (direct gaze: {gaze}%).")
        }
        Band::Critical => {
            format!("Critical: eye contact was rarely detected (direct gaze: {gaze}%). Ensure good lighting and look directly at the camera.")
        }
    }
}

pub fn posture_feedback(score: u8, rates: &FeedbackRates) -> String {
    let stability = percent(rates.stability);
    let centering = percent(rates.centering);
    match Dimension::Posture.band(score) {
        Band::Excellent => format!(
            "Steady, well-framed posture (stability: {stability}%, centered: {centering}%)."
        ),
        Band::Good => format!(
            "Mostly steady posture with some drift (stability: {stability}%, centered: {centering}%)."
        ),
        Band::Fair => format!(
            "Noticeable shifting or leaning during the recording (stability: {stability}%, centered: {centering}%)."
        ),
        Band::Critical => format!(
            "Critical: your position was rarely stable or centered (stability: {stability}%, centered: {centering}%)."
        ),
    }
}

pub fn gesture_feedback(score: u8, rates: &FeedbackRates) -> String {
    let natural = percent(rates.natural_gesture);
    match Dimension::Gestures.band(score) {
        Band::Excellent => {
            format!("Natural, well-paced movement (natural movement: {natural}%).")
        }
        Band::Good => {
            format!("Reasonable movement; a few more deliberate gestures would help (natural movement: {natural}%).")
        }
        Band::Fair => {
            format!("Movement was limited or uneven (natural movement: {natural}%).")
        }
        Band::Critical => {
            format!("Critical: almost no natural movement was observed (natural movement: {natural}%).")
        }
    }
}

pub fn speech_feedback(score: u8, rates: &FeedbackRates) -> String {
    let visible = percent(rates.face_detection);
    let length = format_duration(rates.duration_secs);
    match Dimension::Speech.band(score) {
        Band::Excellent => {
            format!("Well-sustained delivery (length: {length}, face visible: {visible}%).")
        }
        Band::Good => {
            format!("Solid delivery (length: {length}, face visible: {visible}%).")
        }
        Band::Fair => {
            format!("Delivery was hard to judge from this recording (length: {length}, face visible: {visible}%).")
        }
        Band::Critical => {
            format!("Critical: too little usable footage (length: {length}, face visible: {visible}%).")
        }
    }
}

pub fn confidence_feedback(score: u8, rates: &FeedbackRates) -> String {
    let visible = percent(rates.face_detection);
    match Dimension::Confidence.band(score) {
        Band::Excellent => {
            format!("You came across as confident and composed (face visible: {visible}%).")
        }
        Band::Good => format!("You appeared fairly confident (face visible: {visible}%)."),
        Band::Fair => {
            format!("Some hesitancy showed through gaze and posture (face visible: {visible}%).")
        }
        Band::Critical => {
            format!("Critical: gaze and posture signalled low confidence (face visible: {visible}%).")
        }
    }
}

/// Setup advice when the face was often not found.
pub fn setup_recommendation(face_detection_rate: f64) -> Option<String> {
    let visible = percent(face_detection_rate);
    if face_detection_rate < 0.4 {
        Some(format!(
            "Setup (critical): your face was visible in only {visible}% of frames. Ensure good lighting, face the camera, and keep your whole face in view."
        ))
    } else if face_detection_rate < 0.7 {
        Some(format!(
            "Setup: your face was visible in {visible}% of frames. Improve front lighting and keep the camera at eye level."
        ))
    } else {
        None
    }
}

pub fn duration_recommendation(duration_secs: f64) -> Option<String> {
    if duration_secs < 30.0 {
        Some("Length: record at least 30 seconds so there is enough footage to assess your delivery.".to_string())
    } else if duration_secs > 300.0 {
        Some("Length: keep practice takes under five minutes; shorter takes are easier to review and repeat.".to_string())
    } else {
        None
    }
}

pub fn closing_line(overall: u8) -> String {
    if overall < 60 {
        "Focus on one area at a time and record again; steady practice shows quickly."
    } else if overall < 80 {
        "A solid foundation. Work on the points above to reach the top band."
    } else {
        "Strong delivery. Keep practicing to stay consistent."
    }
    .to_string()
}

fn percent(rate: f64) -> i64 {
    (rate * 100.0).round() as i64
}

fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
