//! Timeline sampling.
//!
//! This module provides [`SamplingParameters`] for describing which slice of
//! a media timeline to sample, and [`sample_timestamps`] for turning those
//! parameters into the ordered list of capture timestamps.

/// Step value used when a caller supplies a non-positive or non-finite step.
pub const DEFAULT_STEP_SECS: f64 = 5.0;

/// Which points of the media timeline to capture.
///
/// An immutable value produced by the caller (UI, CLI flags, library code)
/// and passed through the pipeline unchanged. Times are in seconds.
///
/// # Example
///
/// ```
/// use snapreel::SamplingParameters;
///
/// let params = SamplingParameters::new(0.0, 5.0, 12.0);
/// assert_eq!(params.timestamps(), vec![0.0, 5.0, 10.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[must_use]
pub struct SamplingParameters {
    /// First sample timestamp, in seconds.
    pub start: f64,
    /// Distance between consecutive samples, in seconds. Always positive.
    pub step: f64,
    /// Exclusive upper bound for sample timestamps, in seconds.
    pub end: f64,
}

impl SamplingParameters {
    /// Create sampling parameters.
    ///
    /// A negative `start` is clamped to zero. A non-positive (or non-finite)
    /// `step` falls back to [`DEFAULT_STEP_SECS`] rather than producing an
    /// empty or endless schedule.
    pub fn new(start: f64, step: f64, end: f64) -> Self {
        let step = if step.is_finite() && step > 0.0 {
            step
        } else {
            DEFAULT_STEP_SECS
        };
        Self {
            start: start.max(0.0),
            step,
            end,
        }
    }

    /// Clamp these parameters to a source's total duration.
    ///
    /// `end` is capped at `duration` and `start` at the resulting `end`, so
    /// the schedule never reaches past the media.
    pub fn clamped_to(self, duration: f64) -> Self {
        let end = self.end.min(duration);
        Self {
            start: self.start.min(end),
            step: self.step,
            end,
        }
    }

    /// The ordered capture timestamps for these parameters.
    ///
    /// See [`sample_timestamps`].
    pub fn timestamps(&self) -> Vec<f64> {
        sample_timestamps(self.start, self.step, self.end)
    }
}

/// Compute the ordered sample timestamps `start, start+step, start+2*step, …`
/// strictly less than `end`.
///
/// Returns an empty sequence when `start >= end`. The function is pure and
/// stateless; for valid inputs the count equals `ceil((end - start) / step)`.
pub fn sample_timestamps(start: f64, step: f64, end: f64) -> Vec<f64> {
    let step = if step.is_finite() && step > 0.0 {
        step
    } else {
        DEFAULT_STEP_SECS
    };

    let mut timestamps = Vec::new();
    let mut t = start;
    while t < end {
        timestamps.push(t);
        t += step;
    }
    timestamps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_match_ceil_formula() {
        let cases: [(f64, f64, f64); 3] = [(0.0, 5.0, 12.0), (1.0, 0.5, 4.0), (3.0, 2.0, 3.5)];
        for (start, step, end) in cases {
            let expected = ((end - start) / step).ceil() as usize;
            assert_eq!(sample_timestamps(start, step, end).len(), expected);
        }
    }

    #[test]
    fn start_at_or_past_end_is_empty() {
        assert!(sample_timestamps(10.0, 1.0, 10.0).is_empty());
        assert!(sample_timestamps(11.0, 1.0, 10.0).is_empty());
    }

    #[test]
    fn invalid_step_uses_default() {
        let params = SamplingParameters::new(0.0, 0.0, 12.0);
        assert_eq!(params.step, DEFAULT_STEP_SECS);
        assert_eq!(params.timestamps(), vec![0.0, 5.0, 10.0]);
    }
}
