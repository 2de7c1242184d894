//! # snapreel
//!
//! Sample still frames from video files and export the frame sequence as a
//! multi-page PDF document, an animated GIF loop, or a ZIP archive of
//! individual JPEG images.
//!
//! `snapreel` is built around a capture-and-export pipeline: a pure
//! sampling clock turns a time window into capture timestamps, a frame
//! extractor walks a [`MediaSource`] through them strictly in order, a
//! capture cache memoizes the result so repeat exports never re-extract,
//! a shared transform stage applies one compression ratio uniformly, and
//! three independent encoders turn the sequence into its final artifact.
//!
//! ## Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "ffmpeg")]
//! # async fn demo() -> Result<(), snapreel::SnapreelError> {
//! use snapreel::ffmpeg::FfmpegSource;
//! use snapreel::{ExportFormat, ExportSettings, Pipeline, SamplingParameters};
//!
//! let mut pipeline = Pipeline::new();
//! pipeline.load_source(Box::new(FfmpegSource::open("input.mp4")?))?;
//!
//! // One frame every 5 seconds, packaged as a ZIP of JPEGs.
//! let settings = ExportSettings::new(
//!     ExportFormat::Archive,
//!     SamplingParameters::new(0.0, 5.0, f64::MAX),
//! )
//! .with_compression_ratio(80);
//!
//! let artifact = pipeline.export(&settings).await?;
//! std::fs::write(&artifact.file_name, &artifact.bytes)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Design
//!
//! - **Deterministic sampling** — `start, start+step, …` strictly below
//!   the end bound; an invalid step falls back to a documented default.
//! - **Capture memoization** — the frame sequence is keyed on sampling
//!   parameters plus source identity (name *and* load generation, so
//!   reloading a same-named file never serves stale frames). Changing
//!   only the compression ratio re-runs the transform, not the capture.
//! - **Strictly sequential extraction** — one seek in flight at a time,
//!   with an explicit seek timeout and a pacing delay between captures.
//! - **Best-effort loop export** — a frame that fails to decode is
//!   logged and skipped rather than aborting the GIF; every other
//!   failure aborts the run and is surfaced, never retried.
//! - **Traits at the seams** — [`MediaSource`], [`FrameEncoder`],
//!   [`ArtifactSink`], and [`ProgressSink`] are injected at composition
//!   time; the pipeline never inspects concrete types.
//!
//! ## Cargo features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ffmpeg` | [`FfmpegSource`](crate::ffmpeg::FfmpegSource), a `MediaSource` backed by the FFmpeg libraries, plus the `snapreel` CLI |

pub mod archive;
pub mod cache;
pub mod capture;
pub mod document;
pub mod encode;
pub mod error;
#[cfg(feature = "ffmpeg")]
pub mod ffmpeg;
pub mod frame;
pub mod gif;
pub mod pipeline;
pub mod progress;
pub mod source;
pub mod timeline;
pub mod transform;

pub use archive::{ArchiveEncoder, BATCH_SIZE};
pub use cache::{CaptureCache, CaptureKey};
pub use capture::{CAPTURE_PACING, CaptureOptions, SEEK_TIMEOUT, extract_sequence};
pub use document::{DocumentEncoder, REFERENCE_DPI, px_to_mm};
pub use encode::{
    Artifact, ArtifactSink, DEFAULT_LOOP_DELAY_MS, DirectorySink, ExportFormat, ExportRequest,
    FrameEncoder, archive_entry_name, archive_file_name, document_file_name, loop_file_name,
};
pub use error::SnapreelError;
#[cfg(feature = "ffmpeg")]
pub use ffmpeg::FfmpegSource;
pub use frame::{CAPTURE_JPEG_QUALITY, FramePayload, FrameSequence};
pub use gif::LoopEncoder;
pub use pipeline::{ExportSettings, Pipeline, PipelineState};
pub use progress::{CancellationToken, Phase, ProgressSink, ProgressUpdate};
pub use source::{MediaSource, SourceDescriptor, SourceIdentity};
pub use timeline::{DEFAULT_STEP_SECS, SamplingParameters, sample_timestamps};
pub use transform::{SCALE_FLOOR, SCALE_KNEE, compress_payload, compress_sequence, validate_ratio};
