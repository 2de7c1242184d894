//! Progress reporting and cancellation support.
//!
//! The pipeline reports its work through the [`ProgressSink`] trait: an
//! integer percentage while frames are being captured, a cleared percentage
//! plus a phase message while an artifact is being generated. Long captures
//! can be aborted cooperatively through a [`CancellationToken`].
//!
//! # Example
//!
//! ```
//! use snapreel::{ProgressSink, ProgressUpdate};
//!
//! struct PrintProgress;
//!
//! impl ProgressSink for PrintProgress {
//!     fn on_progress(&self, update: &ProgressUpdate) {
//!         match update.percent {
//!             Some(pct) => println!("{} {pct}%", update.message),
//!             None => println!("{}", update.message),
//!         }
//!     }
//!
//!     fn on_clear(&self) {}
//! }
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// The pipeline phase a progress update belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Phase {
    /// Frames are being extracted from the media source.
    Capturing,
    /// The frame sequence is being encoded into the output artifact.
    Encoding,
}

impl Phase {
    /// The human-readable message shown for this phase.
    pub fn message(self) -> &'static str {
        match self {
            Phase::Capturing => "Capturing frames...",
            Phase::Encoding => "Generating file...",
        }
    }
}

/// A snapshot of pipeline progress.
///
/// `percent` is a whole-number 0–100 completion figure during capture and
/// `None` during encoding, where no meaningful fraction exists — the
/// surface should show only the phase message then.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Which phase the pipeline is in.
    pub phase: Phase,
    /// Percent complete, or `None` when the indicator should be cleared.
    pub percent: Option<u8>,
    /// Human-readable phase message.
    pub message: &'static str,
}

impl ProgressUpdate {
    /// A capture-phase update at the given percentage.
    pub fn capturing(percent: u8) -> Self {
        Self {
            phase: Phase::Capturing,
            percent: Some(percent.min(100)),
            message: Phase::Capturing.message(),
        }
    }

    /// An encode-phase update with the percentage cleared.
    pub fn encoding() -> Self {
        Self {
            phase: Phase::Encoding,
            percent: None,
            message: Phase::Encoding.message(),
        }
    }
}

/// Trait for receiving progress updates from the pipeline.
///
/// Implementations must be [`Send`] and [`Sync`]. Sinks are **infallible**
/// observers — they can render but never halt the pipeline; use a
/// [`CancellationToken`] to stop work.
///
/// [`on_clear`](ProgressSink::on_clear) is invoked exactly once per run,
/// on success and on failure alike, so a blocking indicator can always be
/// torn down.
pub trait ProgressSink: Send + Sync {
    /// Called whenever the pipeline advances.
    fn on_progress(&self, update: &ProgressUpdate);

    /// Called when the run ends, however it ends.
    fn on_clear(&self);
}

/// A no-op implementation that discards all progress notifications.
///
/// This is the default when no sink is configured.
pub(crate) struct NoOpProgress;

impl ProgressSink for NoOpProgress {
    fn on_progress(&self, _update: &ProgressUpdate) {}

    fn on_clear(&self) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone the token and hand one copy to
/// [`CaptureOptions`](crate::CaptureOptions); call
/// [`cancel`](CancellationToken::cancel) from anywhere to request that the
/// capture loop stop before its next frame.
///
/// # Example
///
/// ```
/// use snapreel::CancellationToken;
///
/// let token = CancellationToken::new();
/// let observer = token.clone();
/// token.cancel();
/// assert!(observer.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones observe the change.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
