//! Error types for the `snapreel` crate.
//!
//! This module defines [`SnapreelError`], the unified error type returned by
//! all fallible operations in the crate. Errors carry enough context to
//! diagnose the problem without additional logging at the call site.

use std::io::Error as IoError;

use image::ImageError;
use thiserror::Error;

/// The unified error type for all `snapreel` operations.
///
/// Every public method that can fail returns `Result<T, SnapreelError>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SnapreelError {
    /// An export was requested before any media source was loaded.
    #[error("No media source loaded")]
    NoSourceLoaded,

    /// The selected input is not a recognizable video.
    #[error("Not a valid media file: {name}")]
    InvalidMediaType {
        /// Name of the rejected input.
        name: String,
    },

    /// An encoder was handed a frame sequence with no frames.
    #[error("Frame sequence is empty")]
    EmptyFrameSequence,

    /// The compression ratio is outside the accepted `1..=100` range.
    #[error("Compression ratio must be between 1 and 100, got {0}")]
    InvalidCompressionRatio(u8),

    /// A frame payload could not be decoded as an image.
    #[error("Frame {index} is not a recognizable image payload")]
    MalformedFramePayload {
        /// Zero-based index of the bad frame in the sequence.
        index: usize,
    },

    /// The media source never signalled seek-complete within the bound.
    #[error("Timed out after {waited:?} waiting for seek to {timestamp}s")]
    ExtractionTimeout {
        /// The sample timestamp that was being sought, in seconds.
        timestamp: f64,
        /// How long the extractor waited before giving up.
        waited: std::time::Duration,
    },

    /// A third-party writer (PDF, GIF, or ZIP backend) failed.
    #[error("Encoder failure: {0}")]
    EncoderFailure(String),

    /// No encoder is registered for the requested output format.
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// The operation was cancelled via a
    /// [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,

    /// An I/O error occurred while reading or writing.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate during payload conversion.
    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),

    /// The media container could not be opened.
    #[cfg(feature = "ffmpeg")]
    #[error("Failed to open media file at {path}: {reason}")]
    SourceOpen {
        /// Path that was passed to [`crate::FfmpegSource::open`](crate::ffmpeg::FfmpegSource::open).
        path: std::path::PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// A video frame could not be decoded by the FFmpeg backend.
    #[cfg(feature = "ffmpeg")]
    #[error("Failed to decode video frame: {0}")]
    FrameDecode(String),
}

#[cfg(feature = "ffmpeg")]
impl From<ffmpeg_next::Error> for SnapreelError {
    fn from(error: ffmpeg_next::Error) -> Self {
        SnapreelError::FrameDecode(error.to_string())
    }
}
