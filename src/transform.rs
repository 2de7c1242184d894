//! The shared image transform stage.
//!
//! Every export format funnels its frames through [`compress_payload`]
//! before encoding. The stage is parameterized by a single compression
//! ratio in percent: `100` keeps the payload byte-for-byte, anything lower
//! applies a geometric downscale followed by a lossier JPEG re-encode.
//!
//! The downscale curve is a policy, not a contract: ratios under
//! [`SCALE_KNEE`] shrink more aggressively than the ratio alone suggests,
//! ratios above it shrink proportionally. Both the knee and the floor are
//! named constants so the curve can be retuned in one place.

use image::imageops::FilterType;

use crate::error::SnapreelError;
use crate::frame::{FramePayload, FrameSequence};

/// Ratio below which the downscale becomes more aggressive.
pub const SCALE_KNEE: u8 = 50;

/// Smallest geometric scale the curve will ever produce.
pub const SCALE_FLOOR: f64 = 0.10;

/// Hard ceiling on the re-encode JPEG quality.
const QUALITY_CEILING: f64 = 90.0;

/// Base multiplier mapping the ratio onto JPEG quality.
const QUALITY_BASE: f64 = 70.0;

/// Check that a compression ratio lies in the accepted `1..=100` range.
pub fn validate_ratio(ratio: u8) -> Result<(), SnapreelError> {
    if ratio == 0 || ratio > 100 {
        return Err(SnapreelError::InvalidCompressionRatio(ratio));
    }
    Ok(())
}

/// The geometric scale applied for a given ratio.
fn scale_factor(ratio: u8) -> f64 {
    let fraction = f64::from(ratio) / 100.0;
    if ratio < SCALE_KNEE {
        (fraction * 1.5).max(SCALE_FLOOR)
    } else {
        fraction
    }
}

/// The JPEG re-encode quality for a given ratio.
fn jpeg_quality(ratio: u8) -> u8 {
    let quality = (QUALITY_BASE * f64::from(ratio) / 100.0).min(QUALITY_CEILING);
    (quality.round() as u8).max(1)
}

/// Downscale and recompress one payload.
///
/// `ratio == 100` is an identity passthrough: the returned payload is
/// byte-identical to the input, which is what keeps cached raw frames
/// valid across ratio changes. Lower ratios decode the payload, resample
/// it to the curve's dimensions (never below 1×1), and re-encode at a
/// quality derived from the ratio. Output is deterministic for
/// deterministic input.
///
/// # Errors
///
/// - [`SnapreelError::InvalidCompressionRatio`] when `ratio` is 0 or
///   above 100.
/// - [`SnapreelError::Image`] when the payload cannot be decoded.
pub fn compress_payload(payload: &FramePayload, ratio: u8) -> Result<FramePayload, SnapreelError> {
    validate_ratio(ratio)?;
    if ratio == 100 {
        return Ok(payload.clone());
    }

    let image = payload.decode()?;
    let scale = scale_factor(ratio);
    let width = ((f64::from(image.width()) * scale).round() as u32).max(1);
    let height = ((f64::from(image.height()) * scale).round() as u32).max(1);

    let resized = image.resize_exact(width, height, FilterType::Triangle);
    FramePayload::from_image_with_quality(&resized, jpeg_quality(ratio))
}

/// Apply [`compress_payload`] uniformly across a captured sequence.
///
/// Timestamps pass through untouched; only the payloads change. A frame
/// that cannot be decoded fails the whole pass with
/// [`SnapreelError::MalformedFramePayload`] carrying the frame's index.
pub fn compress_sequence(
    sequence: &FrameSequence,
    ratio: u8,
) -> Result<FrameSequence, SnapreelError> {
    validate_ratio(ratio)?;
    log::debug!(
        "Transforming {} frames at ratio {ratio}",
        sequence.len(),
    );

    let mut frames = Vec::with_capacity(sequence.len());
    for (index, payload) in sequence.frames().iter().enumerate() {
        let transformed = compress_payload(payload, ratio).map_err(|error| match error {
            SnapreelError::Image(_) => SnapreelError::MalformedFramePayload { index },
            other => other,
        })?;
        frames.push(transformed);
    }

    Ok(FrameSequence::new(sequence.timestamps().to_vec(), frames))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_curve_has_knee_and_floor() {
        // Proportional above the knee.
        assert!((scale_factor(100) - 1.0).abs() < 1e-9);
        assert!((scale_factor(50) - 0.5).abs() < 1e-9);
        // Boosted but floored below it.
        assert!((scale_factor(40) - 0.6).abs() < 1e-9);
        assert!((scale_factor(1) - SCALE_FLOOR).abs() < 1e-9);
    }

    #[test]
    fn quality_tracks_ratio() {
        assert_eq!(jpeg_quality(100), 70);
        assert_eq!(jpeg_quality(50), 35);
        assert_eq!(jpeg_quality(1), 1);
    }
}
