//! Sequential frame capture.
//!
//! [`extract_sequence`] drives a [`MediaSource`] through an ordered list of
//! sample timestamps: seek, wait for the seek to complete, rasterize, then
//! pause briefly before the next capture. Seeks are issued strictly one at
//! a time — the source's rasterization surface is exclusively owned, and
//! overlapping seeks on the same handle produce undefined results.
//!
//! [`CaptureOptions`] threads the pacing delay, the seek timeout, and an
//! optional cancellation token through the loop without widening every
//! signature.

use std::time::Duration;

use crate::error::SnapreelError;
use crate::frame::{FramePayload, FrameSequence};
use crate::progress::{CancellationToken, ProgressSink, ProgressUpdate};
use crate::source::MediaSource;

/// Pause inserted between successive captures so the source is never
/// overwhelmed by back-to-back seeks.
pub const CAPTURE_PACING: Duration = Duration::from_millis(100);

/// How long a single seek may take before the capture fails with
/// [`SnapreelError::ExtractionTimeout`].
pub const SEEK_TIMEOUT: Duration = Duration::from_secs(10);

/// Tuning for one capture run.
///
/// Defaults reproduce the documented constants; both bounds are explicit
/// and overridable rather than baked into the loop.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use snapreel::{CancellationToken, CaptureOptions};
///
/// let token = CancellationToken::new();
/// let options = CaptureOptions::new()
///     .with_pacing(Duration::from_millis(20))
///     .with_cancellation(token.clone());
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct CaptureOptions {
    pub(crate) pacing: Duration,
    pub(crate) seek_timeout: Duration,
    pub(crate) cancellation: Option<CancellationToken>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureOptions {
    /// Create options with the default pacing and timeout bounds.
    pub fn new() -> Self {
        Self {
            pacing: CAPTURE_PACING,
            seek_timeout: SEEK_TIMEOUT,
            cancellation: None,
        }
    }

    /// Set the delay between successive captures.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Set the bound on how long one seek may take.
    pub fn with_seek_timeout(mut self, timeout: Duration) -> Self {
        self.seek_timeout = timeout;
        self
    }

    /// Attach a cancellation token, checked before every capture.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Returns `true` if cancellation has been requested.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}

/// Capture one frame per timestamp, strictly in order.
///
/// Progress is reported to `progress` as a whole-number percentage after
/// every frame; the dominant cost of a long export lives here, so the
/// surface gets fine-grained updates.
///
/// # Errors
///
/// - [`SnapreelError::ExtractionTimeout`] if the source never signals
///   seek-complete within the configured bound.
/// - [`SnapreelError::Cancelled`] if the token fires between frames.
/// - Any error the source itself raises while seeking or rasterizing.
pub async fn extract_sequence(
    source: &mut dyn MediaSource,
    timestamps: &[f64],
    options: &CaptureOptions,
    progress: &dyn ProgressSink,
) -> Result<FrameSequence, SnapreelError> {
    log::debug!(
        "Capturing {} frames from {:?}",
        timestamps.len(),
        source.descriptor().name,
    );

    let total = timestamps.len();
    let mut frames: Vec<FramePayload> = Vec::with_capacity(total);
    progress.on_progress(&ProgressUpdate::capturing(0));

    for (index, &timestamp) in timestamps.iter().enumerate() {
        if options.is_cancelled() {
            return Err(SnapreelError::Cancelled);
        }

        if index > 0 && !options.pacing.is_zero() {
            tokio::time::sleep(options.pacing).await;
        }

        match tokio::time::timeout(options.seek_timeout, source.seek(timestamp)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(SnapreelError::ExtractionTimeout {
                    timestamp,
                    waited: options.seek_timeout,
                });
            }
        }

        frames.push(source.rasterize()?);

        let percent = ((index + 1) * 100 / total) as u8;
        progress.on_progress(&ProgressUpdate::capturing(percent));
    }

    Ok(FrameSequence::new(timestamps.to_vec(), frames))
}
