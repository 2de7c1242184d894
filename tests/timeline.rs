//! Sampling clock properties.

use snapreel::{DEFAULT_STEP_SECS, SamplingParameters, sample_timestamps};

// ── sample_timestamps ──────────────────────────────────────────────

#[test]
fn sequence_is_strictly_increasing_from_start() {
    let timestamps = sample_timestamps(1.5, 0.75, 9.0);

    assert_eq!(timestamps[0], 1.5);
    for window in timestamps.windows(2) {
        assert!(window[1] > window[0], "timestamps must strictly increase");
    }
}

#[test]
fn all_timestamps_are_below_end() {
    for (start, step, end) in [(0.0, 5.0, 12.0), (0.0, 4.0, 12.0), (2.0, 3.0, 11.0)] {
        for t in sample_timestamps(start, step, end) {
            assert!(t < end, "timestamp {t} must be below end {end}");
        }
    }
}

#[test]
fn count_matches_ceil_of_span_over_step() {
    let cases: [(f64, f64, f64); 5] = [
        (0.0, 5.0, 12.0),
        (0.0, 5.0, 10.0),
        (0.0, 1.0, 1.0),
        (2.5, 2.5, 10.0),
        (0.0, 7.0, 50.0),
    ];
    for (start, step, end) in cases {
        let expected = ((end - start) / step).ceil() as usize;
        let actual = sample_timestamps(start, step, end).len();
        assert_eq!(actual, expected, "count mismatch for ({start}, {step}, {end})");
    }
}

#[test]
fn empty_when_start_reaches_end() {
    assert!(sample_timestamps(12.0, 5.0, 12.0).is_empty());
    assert!(sample_timestamps(13.0, 5.0, 12.0).is_empty());
}

#[test]
fn twelve_second_scenario() {
    // Duration 12s, start 0, step 5 -> exactly three samples.
    assert_eq!(sample_timestamps(0.0, 5.0, 12.0), vec![0.0, 5.0, 10.0]);
}

// ── Invalid step fallback ──────────────────────────────────────────

#[test]
fn zero_step_falls_back_to_default() {
    let timestamps = sample_timestamps(0.0, 0.0, 12.0);
    assert_eq!(timestamps, vec![0.0, 5.0, 10.0]);
}

#[test]
fn negative_step_falls_back_to_default() {
    let params = SamplingParameters::new(0.0, -2.0, 12.0);
    assert_eq!(params.step, DEFAULT_STEP_SECS);
    assert_eq!(params.timestamps().len(), 3);
}

#[test]
fn nan_step_falls_back_to_default() {
    let params = SamplingParameters::new(0.0, f64::NAN, 12.0);
    assert_eq!(params.step, DEFAULT_STEP_SECS);
}

// ── SamplingParameters clamping ────────────────────────────────────

#[test]
fn end_is_clamped_to_duration() {
    let params = SamplingParameters::new(0.0, 5.0, 1000.0).clamped_to(12.0);
    assert_eq!(params.end, 12.0);
    assert_eq!(params.timestamps(), vec![0.0, 5.0, 10.0]);
}

#[test]
fn start_is_clamped_to_end() {
    let params = SamplingParameters::new(50.0, 5.0, 30.0).clamped_to(12.0);
    assert_eq!(params.start, 12.0);
    assert!(params.timestamps().is_empty());
}

#[test]
fn negative_start_is_clamped_to_zero() {
    let params = SamplingParameters::new(-3.0, 5.0, 12.0);
    assert_eq!(params.start, 0.0);
}
