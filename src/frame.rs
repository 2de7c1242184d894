//! Frame payloads and captured sequences.
//!
//! A [`FramePayload`] is one rasterized frame as an encoded JPEG byte
//! buffer, the unit of currency between the media source, the transform
//! stage, and the export encoders. A [`FrameSequence`] is the ordered,
//! timestamp-aligned result of one capture run.

use std::io::Cursor;

use image::{DynamicImage, codecs::jpeg::JpegEncoder};

use crate::error::SnapreelError;

/// JPEG quality used when rasterizing frames from a source.
///
/// The lossy trade-off belongs to the transform stage, not the capture
/// step, so rasterization keeps quality high.
pub const CAPTURE_JPEG_QUALITY: u8 = 90;

/// One captured frame, encoded as JPEG.
///
/// Payloads are immutable byte buffers. Cloning is a plain buffer copy;
/// sequences share frames through [`std::sync::Arc`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePayload {
    bytes: Vec<u8>,
}

impl FramePayload {
    /// Wrap already-encoded JPEG bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Encode a decoded image into a payload at [`CAPTURE_JPEG_QUALITY`].
    pub fn from_image(image: &DynamicImage) -> Result<Self, SnapreelError> {
        Self::from_image_with_quality(image, CAPTURE_JPEG_QUALITY)
    }

    /// Encode a decoded image into a payload at an explicit JPEG quality.
    pub fn from_image_with_quality(
        image: &DynamicImage,
        quality: u8,
    ) -> Result<Self, SnapreelError> {
        let mut bytes = Vec::new();
        let rgb = image.to_rgb8();
        let mut encoder = JpegEncoder::new_with_quality(Cursor::new(&mut bytes), quality);
        encoder.encode_image(&rgb)?;
        Ok(Self { bytes })
    }

    /// Decode the payload back into pixels.
    ///
    /// # Errors
    ///
    /// Returns [`SnapreelError::Image`] when the bytes are not a decodable
    /// image; callers that know the frame's position map this to
    /// [`SnapreelError::MalformedFramePayload`] with the frame index.
    pub fn decode(&self) -> Result<DynamicImage, SnapreelError> {
        Ok(image::load_from_memory(&self.bytes)?)
    }

    /// The encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the payload, returning the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Size of the encoded payload in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` when the payload holds no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// The ordered result of one capture run.
///
/// `frames[i]` was rasterized at `timestamps[i]`; the two vectors are always
/// the same length. A sequence is immutable once built and is owned by the
/// [`CaptureCache`](crate::CaptureCache) behind an `Arc` until superseded.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    timestamps: Vec<f64>,
    frames: Vec<FramePayload>,
}

impl FrameSequence {
    /// Build a sequence from aligned timestamps and frames.
    ///
    /// # Panics
    ///
    /// Panics if the two vectors differ in length; the capture loop
    /// guarantees alignment, so a mismatch is a programming error.
    pub fn new(timestamps: Vec<f64>, frames: Vec<FramePayload>) -> Self {
        assert_eq!(
            timestamps.len(),
            frames.len(),
            "frame sequence must be index-aligned with its timestamps",
        );
        Self { timestamps, frames }
    }

    /// An empty sequence.
    pub fn empty() -> Self {
        Self {
            timestamps: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// The sample timestamps, in capture order.
    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    /// The frame payloads, index-aligned with [`timestamps`](Self::timestamps).
    pub fn frames(&self) -> &[FramePayload] {
        &self.frames
    }

    /// Number of captured frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` when the run captured no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Iterate `(timestamp, payload)` pairs in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &FramePayload)> {
        self.timestamps.iter().copied().zip(self.frames.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_round_trips_through_jpeg() {
        let image = DynamicImage::new_rgb8(8, 6);
        let payload = FramePayload::from_image(&image).unwrap();
        let decoded = payload.decode().unwrap();
        assert_eq!(decoded.width(), 8);
        assert_eq!(decoded.height(), 6);
    }

    #[test]
    #[should_panic(expected = "index-aligned")]
    fn misaligned_sequence_panics() {
        FrameSequence::new(vec![0.0], Vec::new());
    }
}
