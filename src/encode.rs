//! The export encoder contract.
//!
//! Three independent encoders (document, loop, archive) consume the same
//! input, an [`ExportRequest`], and produce a downloadable [`Artifact`].
//! Implementations are registered with the [`Pipeline`](crate::Pipeline)
//! at composition time and selected by [`ExportFormat`]; nothing
//! dispatches on runtime type checks.
//!
//! Artifact and archive-entry names are produced here, in one place,
//! because downstream consumers depend on the exact convention.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SnapreelError;
use crate::frame::FrameSequence;

/// Frame delay used for loop exports when the caller does not supply one.
pub const DEFAULT_LOOP_DELAY_MS: u32 = 500;

/// The requested output artifact kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Multi-page PDF document, one page per frame.
    Document,
    /// Animated GIF loop.
    Loop,
    /// ZIP archive of individually named JPEG images.
    Archive,
}

impl ExportFormat {
    /// Parse the user-facing format names.
    ///
    /// Accepts the historical aliases: `pdf`, `gif`, and `zip`/`jpg`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "pdf" | "document" => Some(ExportFormat::Document),
            "gif" | "loop" => Some(ExportFormat::Loop),
            "zip" | "jpg" | "archive" => Some(ExportFormat::Archive),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExportFormat::Document => "pdf",
            ExportFormat::Loop => "gif",
            ExportFormat::Archive => "zip",
        };
        f.write_str(name)
    }
}

/// Everything an encoder needs to produce its artifact.
///
/// Built by the pipeline after capture and transform; the frame sequence
/// it carries has already been through the transform stage.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// Which encoder this request is destined for.
    pub format: ExportFormat,
    /// Transformed frames, index-aligned with their sample timestamps.
    pub frames: Arc<FrameSequence>,
    /// Source file name with its extension stripped.
    pub base_name: String,
    /// Intrinsic media width in pixels.
    pub media_width: u32,
    /// Intrinsic media height in pixels.
    pub media_height: u32,
    /// Compression ratio the transform stage ran at, `1..=100`.
    pub compression_ratio: u8,
    /// Per-frame hold time for loop output, in milliseconds.
    pub loop_frame_delay_ms: u32,
}

/// A finished export: bytes plus the suggested file name.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Suggested file name, following the naming convention exactly.
    pub file_name: String,
    /// The encoded artifact.
    pub bytes: Vec<u8>,
}

/// The download boundary collaborator.
///
/// Accepts a finished artifact and saves it; the pipeline itself never
/// touches the file system.
pub trait ArtifactSink: Send + Sync {
    /// Persist or hand off the artifact.
    fn deliver(&self, artifact: &Artifact) -> Result<(), SnapreelError>;
}

/// An [`ArtifactSink`] that writes artifacts into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    directory: PathBuf,
}

impl DirectorySink {
    /// Create a sink rooted at `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// The path an artifact with `file_name` would be written to.
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.directory.join(file_name)
    }
}

impl ArtifactSink for DirectorySink {
    fn deliver(&self, artifact: &Artifact) -> Result<(), SnapreelError> {
        std::fs::create_dir_all(&self.directory)?;
        let path = self.path_for(&artifact.file_name);
        std::fs::write(&path, &artifact.bytes)?;
        log::debug!("Wrote artifact to {}", path.display());
        Ok(())
    }
}

/// One export strategy.
///
/// All three encoders share this contract: same input, same
/// empty-sequence precondition, an [`Artifact`] out.
#[async_trait]
pub trait FrameEncoder: Send + Sync {
    /// The format this encoder produces.
    fn format(&self) -> ExportFormat;

    /// Encode the request into a finished artifact.
    ///
    /// # Errors
    ///
    /// Every encoder fails with [`SnapreelError::EmptyFrameSequence`] when
    /// handed no frames, before any other work happens.
    async fn encode(&self, request: &ExportRequest) -> Result<Artifact, SnapreelError>;
}

/// Shared precondition: reject empty sequences before any side effect.
pub(crate) fn ensure_non_empty(frames: &FrameSequence) -> Result<(), SnapreelError> {
    if frames.is_empty() {
        return Err(SnapreelError::EmptyFrameSequence);
    }
    Ok(())
}

/// `{base}-converted-to-PDF.pdf`
pub fn document_file_name(base_name: &str) -> String {
    format!("{base_name}-converted-to-PDF.pdf")
}

/// `{base}.gif`
pub fn loop_file_name(base_name: &str) -> String {
    format!("{base_name}.gif")
}

/// `{base}.zip`
pub fn archive_file_name(base_name: &str) -> String {
    format!("{base_name}.zip")
}

/// `img_{base}_{elapsed}s_{index+1}.jpg`
///
/// `elapsed` is the frame's sample timestamp in seconds; whole seconds
/// render without a decimal point. The 1-based index keeps entries unique
/// and sortable in capture order.
pub fn archive_entry_name(base_name: &str, elapsed: f64, index: usize) -> String {
    format!("img_{base_name}_{elapsed}s_{}.jpg", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_aliases_parse() {
        assert_eq!(ExportFormat::parse("pdf"), Some(ExportFormat::Document));
        assert_eq!(ExportFormat::parse("GIF"), Some(ExportFormat::Loop));
        assert_eq!(ExportFormat::parse("zip"), Some(ExportFormat::Archive));
        assert_eq!(ExportFormat::parse("jpg"), Some(ExportFormat::Archive));
        assert_eq!(ExportFormat::parse("webm"), None);
    }

    #[test]
    fn names_follow_the_convention() {
        assert_eq!(
            document_file_name("holiday"),
            "holiday-converted-to-PDF.pdf",
        );
        assert_eq!(loop_file_name("holiday"), "holiday.gif");
        assert_eq!(archive_file_name("holiday"), "holiday.zip");
        assert_eq!(archive_entry_name("holiday", 0.0, 0), "img_holiday_0s_1.jpg");
        assert_eq!(
            archive_entry_name("holiday", 7.5, 2),
            "img_holiday_7.5s_3.jpg",
        );
    }
}
