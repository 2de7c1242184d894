//! The export pipeline orchestrator.
//!
//! [`Pipeline`] owns the loaded media source, the capture cache, and the
//! encoder registry, and drives one export request through the full state
//! machine:
//!
//! ```text
//! Idle -> Validating -> (CacheHit | Capturing) -> Transforming -> Encoding -> Done
//! ```
//!
//! with `Failed` reachable from any non-terminal state. Collaborators
//! (encoders, progress sink, capture tuning) are injected at construction
//! time and sources are loaded explicitly, so there is no ambient wiring
//! to reason about.
//!
//! # Example
//!
//! ```no_run
//! use snapreel::{
//!     ExportFormat, ExportSettings, Pipeline, SamplingParameters, SnapreelError,
//! };
//!
//! # async fn example(source: Box<dyn snapreel::MediaSource>) -> Result<(), SnapreelError> {
//! let mut pipeline = Pipeline::new();
//! pipeline.load_source(source)?;
//!
//! let settings = ExportSettings::new(
//!     ExportFormat::Archive,
//!     SamplingParameters::new(0.0, 5.0, f64::MAX),
//! )
//! .with_compression_ratio(80);
//!
//! let artifact = pipeline.export(&settings).await?;
//! println!("{} ({} bytes)", artifact.file_name, artifact.bytes.len());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::archive::ArchiveEncoder;
use crate::cache::{CaptureCache, CaptureKey};
use crate::capture::{CaptureOptions, extract_sequence};
use crate::document::DocumentEncoder;
use crate::encode::{
    Artifact, DEFAULT_LOOP_DELAY_MS, ExportFormat, ExportRequest, FrameEncoder,
};
use crate::error::SnapreelError;
use crate::gif::LoopEncoder;
use crate::progress::{NoOpProgress, ProgressSink, ProgressUpdate};
use crate::source::{MediaSource, SourceDescriptor, SourceIdentity};
use crate::timeline::SamplingParameters;
use crate::transform::{compress_sequence, validate_ratio};

/// One export request as the caller states it.
///
/// The pipeline derives everything else (timestamps, frame payloads,
/// media dimensions, the artifact base name) from the loaded source.
#[derive(Debug, Clone, Copy)]
#[must_use]
pub struct ExportSettings {
    /// Requested output artifact kind.
    pub format: ExportFormat,
    /// Which slice of the timeline to sample.
    pub sampling: SamplingParameters,
    /// Compression ratio for the transform stage, `1..=100`.
    pub compression_ratio: u8,
    /// Per-frame hold time for loop output, in milliseconds.
    pub loop_frame_delay_ms: u32,
}

impl ExportSettings {
    /// Create settings with full quality and the default loop delay.
    pub fn new(format: ExportFormat, sampling: SamplingParameters) -> Self {
        Self {
            format,
            sampling,
            compression_ratio: 100,
            loop_frame_delay_ms: DEFAULT_LOOP_DELAY_MS,
        }
    }

    /// Set the compression ratio.
    pub fn with_compression_ratio(mut self, ratio: u8) -> Self {
        self.compression_ratio = ratio;
        self
    }

    /// Set the per-frame loop delay in milliseconds.
    pub fn with_loop_frame_delay(mut self, delay_ms: u32) -> Self {
        self.loop_frame_delay_ms = delay_ms;
        self
    }
}

/// Where the pipeline currently is in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PipelineState {
    /// Nothing in flight.
    Idle,
    /// Checking preconditions for a new export request.
    Validating,
    /// The memoized sequence matched; capture was skipped.
    CacheHit,
    /// Extracting frames from the source.
    Capturing,
    /// Running the compression/downscale stage.
    Transforming,
    /// The selected encoder is producing the artifact.
    Encoding,
    /// The artifact was handed back; transient, observable mid-run only.
    Done,
    /// The previous export aborted with an error.
    Failed,
}

struct LoadedSource {
    source: Box<dyn MediaSource>,
    identity: SourceIdentity,
}

/// Coordinates capture, caching, transform, and encoding.
///
/// Single-threaded by construction: `export` takes `&mut self`, so a new
/// request, a source swap, or a source deletion can never race a capture
/// that is still in flight.
pub struct Pipeline {
    encoders: Vec<Box<dyn FrameEncoder>>,
    progress: Arc<dyn ProgressSink>,
    capture_options: CaptureOptions,
    cache: CaptureCache,
    source: Option<LoadedSource>,
    next_generation: u64,
    state: PipelineState,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Create a pipeline with the three standard encoders, no progress
    /// sink, and default capture tuning.
    pub fn new() -> Self {
        Self {
            encoders: vec![
                Box::new(DocumentEncoder::new()),
                Box::new(LoopEncoder::new()),
                Box::new(ArchiveEncoder::new()),
            ],
            progress: Arc::new(NoOpProgress),
            capture_options: CaptureOptions::new(),
            cache: CaptureCache::new(),
            source: None,
            next_generation: 0,
            state: PipelineState::Idle,
        }
    }

    /// Attach a progress sink.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Override the capture tuning (pacing, seek timeout, cancellation).
    #[must_use]
    pub fn with_capture_options(mut self, options: CaptureOptions) -> Self {
        self.capture_options = options;
        self
    }

    /// Replace the encoder registry.
    ///
    /// Formats with no registered encoder fail with
    /// [`SnapreelError::UnsupportedFormat`] at export time.
    #[must_use]
    pub fn with_encoders(mut self, encoders: Vec<Box<dyn FrameEncoder>>) -> Self {
        self.encoders = encoders;
        self
    }

    /// The pipeline's current state-machine position.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Metadata of the loaded source, if any.
    pub fn source_descriptor(&self) -> Option<&SourceDescriptor> {
        self.source
            .as_ref()
            .map(|loaded| loaded.source.descriptor())
    }

    /// Load a media source, superseding any previous one.
    ///
    /// Every load is assigned a fresh generation — reloading a file with
    /// the same name still invalidates cached captures. The cached
    /// sequence of the previous source stays in place until a new capture
    /// run completes; its key can no longer match.
    ///
    /// # Errors
    ///
    /// [`SnapreelError::InvalidMediaType`] when the source reports an
    /// unusable duration or zero pixel dimensions.
    pub fn load_source(
        &mut self,
        source: Box<dyn MediaSource>,
    ) -> Result<SourceIdentity, SnapreelError> {
        let descriptor = source.descriptor().clone();
        if !descriptor.duration.is_finite()
            || descriptor.duration <= 0.0
            || descriptor.width == 0
            || descriptor.height == 0
        {
            return Err(SnapreelError::InvalidMediaType {
                name: descriptor.name,
            });
        }

        self.next_generation += 1;
        let identity = SourceIdentity {
            name: descriptor.name,
            generation: self.next_generation,
        };
        log::debug!("Loaded source {identity:?}");
        self.source = Some(LoadedSource {
            source,
            identity: identity.clone(),
        });
        Ok(identity)
    }

    /// Delete the loaded source and drop the cached frame sequence.
    pub fn clear_source(&mut self) {
        if let Some(loaded) = self.source.take() {
            log::debug!("Cleared source {:?}", loaded.identity);
        }
        self.cache.clear();
        self.state = PipelineState::Idle;
    }

    /// Run one export request to completion.
    ///
    /// The returned artifact is ready for the download boundary; the
    /// pipeline resets to `Idle`. On any failure the error is logged with
    /// its cause, the cache keeps its last-known-good sequence, and the
    /// progress indicator is cleared — the cleanup path is the same for
    /// every exit.
    pub async fn export(
        &mut self,
        settings: &ExportSettings,
    ) -> Result<Artifact, SnapreelError> {
        self.state = PipelineState::Validating;
        let result = self.run_export(settings).await;

        // Single cleanup path: clear the indicator whatever happened.
        self.progress.on_clear();
        match &result {
            Ok(artifact) => {
                log::debug!("Export finished: {}", artifact.file_name);
                self.state = PipelineState::Idle;
            }
            Err(error) => {
                log::error!("Export failed in {:?}: {error}", self.state);
                self.state = PipelineState::Failed;
            }
        }
        result
    }

    async fn run_export(
        &mut self,
        settings: &ExportSettings,
    ) -> Result<Artifact, SnapreelError> {
        validate_ratio(settings.compression_ratio)?;

        // Split borrows: the capture closure needs the source while the
        // cache is borrowed mutably.
        let Pipeline {
            encoders,
            progress,
            capture_options,
            cache,
            source,
            state,
            ..
        } = self;

        let loaded = source.as_mut().ok_or(SnapreelError::NoSourceLoaded)?;
        let descriptor = loaded.source.descriptor().clone();

        let params = settings.sampling.clamped_to(descriptor.duration);
        let key = CaptureKey {
            params,
            identity: loaded.identity.clone(),
        };

        let frames = if cache.lookup(&key).is_some() {
            *state = PipelineState::CacheHit;
            log::debug!("Reusing cached frames for {:?}", key.identity);
            cache.lookup(&key).expect("lookup hit re-checked")
        } else {
            *state = PipelineState::Capturing;
            let timestamps = params.timestamps();
            let source = loaded.source.as_mut();
            let progress = progress.as_ref();
            let options = &*capture_options;
            cache
                .get_or_build(key, move || async move {
                    extract_sequence(source, &timestamps, options, progress).await
                })
                .await?
        };

        *state = PipelineState::Transforming;
        progress.on_progress(&ProgressUpdate::encoding());
        let transformed = if settings.compression_ratio == 100 {
            Arc::clone(&frames)
        } else {
            Arc::new(compress_sequence(&frames, settings.compression_ratio)?)
        };

        *state = PipelineState::Encoding;

        let request = ExportRequest {
            format: settings.format,
            frames: transformed,
            base_name: descriptor.base_name().to_string(),
            media_width: descriptor.width,
            media_height: descriptor.height,
            compression_ratio: settings.compression_ratio,
            loop_frame_delay_ms: settings.loop_frame_delay_ms,
        };

        let encoder = encoders
            .iter()
            .find(|encoder| encoder.format() == settings.format)
            .ok_or_else(|| SnapreelError::UnsupportedFormat(settings.format.to_string()))?;
        let artifact = encoder.encode(&request).await?;

        *state = PipelineState::Done;
        Ok(artifact)
    }
}
