//! Sampling clock for the analysis loop.
//!
//! The frame loop visits timestamps `0, step, 2*step, ...` strictly below the
//! video duration. Timestamps are derived from an integer index rather than
//! accumulated, so long videos do not drift.

use std::time::Instant;

/// Fixed-step timestamp schedule over a video duration.
#[derive(Debug, Clone, Copy)]
pub struct SampleClock {
    step_secs: f64,
    duration_secs: f64,
}

impl SampleClock {
    /// Create a schedule. Non-positive or non-finite inputs yield an empty
    /// schedule.
    pub fn new(step_secs: f64, duration_secs: f64) -> Self {
        Self {
            step_secs,
            duration_secs,
        }
    }

    pub fn step_secs(&self) -> f64 {
        self.step_secs
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    fn is_valid(&self) -> bool {
        self.step_secs.is_finite()
            && self.step_secs > 0.0
            && self.duration_secs.is_finite()
            && self.duration_secs > 0.0
    }

    /// Timestamp of the `index`-th sample, if it falls before the end.
    pub fn timestamp(&self, index: u64) -> Option<f64> {
        if !self.is_valid() {
            return None;
        }
        let t = index as f64 * self.step_secs;
        (t < self.duration_secs).then_some(t)
    }

    /// Number of samples the schedule will produce.
    pub fn expected_samples(&self) -> u64 {
        if !self.is_valid() {
            return 0;
        }
        // The division can land one off either way at exact multiples;
        // timestamp() is the source of truth.
        let mut n = (self.duration_secs / self.step_secs).ceil() as u64;
        while n > 0 && self.timestamp(n - 1).is_none() {
            n -= 1;
        }
        while self.timestamp(n).is_some() {
            n += 1;
        }
        n
    }

    /// Iterate over all sample timestamps.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0u64..)
            .map(move |i| self.timestamp(i))
            .take_while(Option::is_some)
            .flatten()
    }
}

/// Wall-clock stopwatch for run timing.
#[derive(Debug, Clone)]
pub struct RunClock {
    started: Instant,
    started_wall: String,
}

impl RunClock {
    /// Start timing now.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            started_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Seconds elapsed since start.
    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Wall-clock time at start (ISO 8601 string).
    pub fn started_wall(&self) -> &str {
        &self.started_wall
    }
}
