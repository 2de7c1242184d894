//! Capture memoization.
//!
//! Extracting a long frame sequence dominates the wall-clock cost of an
//! export, so the result of one capture run is memoized against the exact
//! tuple that produced it. Re-exporting the same slice of the same source
//! reuses the cached raw frames, whatever the output format or
//! compression ratio; changing the sampling window or reloading the
//! source invalidates them.
//!
//! The compression ratio is not part of [`CaptureKey`]: it
//! parameterizes the transform stage downstream of capture, and the
//! transform is byte-preserving at ratio 100, so cached raw frames stay
//! valid across ratio changes.

use std::sync::Arc;

use crate::error::SnapreelError;
use crate::frame::FrameSequence;
use crate::source::SourceIdentity;
use crate::timeline::SamplingParameters;

/// The tuple a memoized frame sequence is keyed on.
///
/// Two keys are equal iff their sampling parameters and source identity are
/// equal. Identity includes the load generation, so reloading a same-named
/// file never produces a stale hit.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureKey {
    /// Sampling window and step the sequence was captured with.
    pub params: SamplingParameters,
    /// Which loaded source the sequence came from.
    pub identity: SourceIdentity,
}

/// Memoizes the most recent successfully captured [`FrameSequence`].
///
/// Holds at most one sequence. The memoized key and the sequence are only
/// ever replaced together, after a build fully succeeds, so a failed build
/// leaves the last-known-good state untouched.
#[derive(Debug, Default)]
pub struct CaptureCache {
    key: Option<CaptureKey>,
    frames: Option<Arc<FrameSequence>>,
}

impl CaptureCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached sequence iff `key` matches the memoized key.
    pub fn lookup(&self, key: &CaptureKey) -> Option<Arc<FrameSequence>> {
        match (&self.key, &self.frames) {
            (Some(memoized), Some(frames)) if memoized == key => Some(Arc::clone(frames)),
            _ => None,
        }
    }

    /// Fetch the sequence for `key`, building it if necessary.
    ///
    /// On a hit the cached sequence is returned without invoking `build`.
    /// Otherwise `build` runs to completion and the cache replaces both the
    /// key and the sequence in one step; a build error propagates without
    /// touching the cached state.
    pub async fn get_or_build<F, Fut>(
        &mut self,
        key: CaptureKey,
        build: F,
    ) -> Result<Arc<FrameSequence>, SnapreelError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<FrameSequence, SnapreelError>>,
    {
        if let Some(frames) = self.lookup(&key) {
            log::debug!("Capture cache hit for {:?}", key.identity);
            return Ok(frames);
        }

        log::debug!("Capture cache miss for {:?}; building", key.identity);
        let frames = Arc::new(build().await?);
        self.key = Some(key);
        self.frames = Some(Arc::clone(&frames));
        Ok(frames)
    }

    /// Drop the memoized key and sequence.
    ///
    /// Called when the source is deleted or cleared; the next export always
    /// rebuilds.
    pub fn clear(&mut self) {
        self.key = None;
        self.frames = None;
    }

    /// `true` when a sequence is currently memoized.
    pub fn is_populated(&self) -> bool {
        self.key.is_some() && self.frames.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FramePayload;

    fn key(generation: u64, step: f64) -> CaptureKey {
        CaptureKey {
            params: SamplingParameters::new(0.0, step, 10.0),
            identity: SourceIdentity {
                name: "clip.mp4".to_string(),
                generation,
            },
        }
    }

    fn one_frame() -> FrameSequence {
        FrameSequence::new(vec![0.0], vec![FramePayload::from_bytes(vec![0xFF])])
    }

    #[tokio::test]
    async fn build_runs_once_per_key() {
        let mut cache = CaptureCache::new();
        let mut builds = 0;

        for _ in 0..3 {
            cache
                .get_or_build(key(1, 5.0), || {
                    builds += 1;
                    async { Ok(one_frame()) }
                })
                .await
                .unwrap();
        }

        assert_eq!(builds, 1);
    }

    #[tokio::test]
    async fn failed_build_preserves_previous_sequence() {
        let mut cache = CaptureCache::new();
        cache
            .get_or_build(key(1, 5.0), || async { Ok(one_frame()) })
            .await
            .unwrap();

        let result = cache
            .get_or_build(key(1, 2.0), || async {
                Err(SnapreelError::EmptyFrameSequence)
            })
            .await;
        assert!(result.is_err());

        // The old key still hits; the failed key never replaced it.
        assert!(cache.lookup(&key(1, 5.0)).is_some());
        assert!(cache.lookup(&key(1, 2.0)).is_none());
    }

    #[tokio::test]
    async fn generation_change_misses() {
        let mut cache = CaptureCache::new();
        cache
            .get_or_build(key(1, 5.0), || async { Ok(one_frame()) })
            .await
            .unwrap();
        assert!(cache.lookup(&key(2, 5.0)).is_none());
    }
}
