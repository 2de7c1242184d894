//! The media source collaborator boundary.
//!
//! The pipeline never talks to a concrete decoder directly; it consumes the
//! [`MediaSource`] trait, which captures exactly what the capture loop
//! needs from a loaded video: its duration, its intrinsic pixel dimensions,
//! an awaitable seek, and a rasterization surface for the current frame.
//!
//! The crate ships one implementation,
//! [`FfmpegSource`](crate::ffmpeg::FfmpegSource), behind the `ffmpeg`
//! feature; tests substitute lightweight in-memory sources.

use async_trait::async_trait;

use crate::error::SnapreelError;
use crate::frame::FramePayload;

/// Static facts about a loaded media source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDescriptor {
    /// File name of the source, extension included.
    pub name: String,
    /// Total duration in seconds. Available once metadata is ready.
    pub duration: f64,
    /// Intrinsic decoded width in pixels.
    pub width: u32,
    /// Intrinsic decoded height in pixels.
    pub height: u32,
}

impl SourceDescriptor {
    /// The source name with its final extension removed.
    ///
    /// Used as the base for every artifact and archive-entry name. A name
    /// without an extension is returned unchanged.
    pub fn base_name(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((base, _)) if !base.is_empty() => base,
            _ => &self.name,
        }
    }
}

/// Identity of one loaded source.
///
/// The generation counter increments on every load, including reloading a
/// file with the same name, so identity is never based on the name alone.
/// Assigned by [`Pipeline::load_source`](crate::Pipeline::load_source).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceIdentity {
    /// File name of the source.
    pub name: String,
    /// Monotonically increasing load counter.
    pub generation: u64,
}

/// A loaded video the capture loop can sample.
///
/// # Contract
///
/// * [`seek`](MediaSource::seek) resolves only once the source has finished
///   seeking and the frame at the requested position is decodable. Callers
///   must never issue a second seek before the first resolves; the
///   rasterization surface is exclusively owned and concurrent seeks on the
///   same source produce undefined results.
/// * [`rasterize`](MediaSource::rasterize) captures the current frame at
///   the source's native decoded dimensions — output size tracks the
///   intrinsic resolution, never a fixed value.
#[async_trait]
pub trait MediaSource: Send {
    /// Metadata for the loaded source.
    fn descriptor(&self) -> &SourceDescriptor;

    /// Seek to `timestamp` (seconds) and wait for the seek to complete.
    async fn seek(&mut self, timestamp: f64) -> Result<(), SnapreelError>;

    /// Rasterize the frame at the current position into a payload.
    fn rasterize(&mut self) -> Result<FramePayload, SnapreelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str) -> SourceDescriptor {
        SourceDescriptor {
            name: name.to_string(),
            duration: 10.0,
            width: 640,
            height: 480,
        }
    }

    #[test]
    fn base_name_strips_final_extension_only() {
        assert_eq!(descriptor("clip.mp4").base_name(), "clip");
        assert_eq!(descriptor("my.holiday.mkv").base_name(), "my.holiday");
        assert_eq!(descriptor("noext").base_name(), "noext");
        assert_eq!(descriptor(".hidden").base_name(), ".hidden");
    }

    #[test]
    fn identity_distinguishes_generations() {
        let first = SourceIdentity {
            name: "clip.mp4".to_string(),
            generation: 1,
        };
        let reload = SourceIdentity {
            name: "clip.mp4".to_string(),
            generation: 2,
        };
        assert_ne!(first, reload);
    }
}
