//! Archive export.
//!
//! [`ArchiveEncoder`] packages the captured frames as individually named
//! JPEG entries in a ZIP container. Entry names embed the base name, the
//! frame's sample timestamp in elapsed seconds, and its 1-based index, so
//! entries are unique and sort in capture order.
//!
//! Frames are prepared in fixed-size batches: entries within a batch run
//! concurrently (cooperative interleaving, not threads), batches run
//! sequentially, which bounds peak memory without serializing everything.
//! Global index order is preserved across batch boundaries.

use std::io::{Cursor, Write};

use async_trait::async_trait;
use futures::future::try_join_all;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::encode::{
    Artifact, ExportFormat, ExportRequest, FrameEncoder, archive_entry_name, archive_file_name,
};
use crate::encode::ensure_non_empty;
use crate::error::SnapreelError;
use crate::transform::validate_ratio;

/// How many entries are prepared concurrently before the next batch starts.
pub const BATCH_SIZE: usize = 5;

/// Encodes a frame sequence as a ZIP archive of JPEG images.
#[derive(Debug, Default)]
pub struct ArchiveEncoder;

impl ArchiveEncoder {
    /// Create the encoder.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FrameEncoder for ArchiveEncoder {
    fn format(&self) -> ExportFormat {
        ExportFormat::Archive
    }

    async fn encode(&self, request: &ExportRequest) -> Result<Artifact, SnapreelError> {
        ensure_non_empty(&request.frames)?;
        validate_ratio(request.compression_ratio)?;

        let frames = request.frames.frames();
        let timestamps = request.frames.timestamps();
        let total = frames.len();
        log::debug!(
            "Packaging {total} frames into {} (batch size {BATCH_SIZE})",
            archive_file_name(&request.base_name),
        );

        let mut entries: Vec<(String, Vec<u8>)> = Vec::with_capacity(total);
        let mut batch_start = 0;
        while batch_start < total {
            let batch_end = (batch_start + BATCH_SIZE).min(total);
            let jobs = (batch_start..batch_end).map(|index| {
                let payload = &frames[index];
                let name = archive_entry_name(&request.base_name, timestamps[index], index);
                async move {
                    // Reject anything that is no longer a recognizable image
                    // after the transform stage.
                    payload
                        .decode()
                        .map_err(|_| SnapreelError::MalformedFramePayload { index })?;
                    Ok::<_, SnapreelError>((name, payload.as_bytes().to_vec()))
                }
            });
            entries.extend(try_join_all(jobs).await?);
            batch_start = batch_end;
        }

        // Payloads below ratio 100 were already recompressed by the
        // transform stage and do not deflate further.
        let method = if request.compression_ratio < 100 {
            CompressionMethod::Stored
        } else {
            CompressionMethod::Deflated
        };

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in entries {
            let options = SimpleFileOptions::default().compression_method(method);
            writer
                .start_file(name, options)
                .map_err(|e| SnapreelError::EncoderFailure(format!("ZIP entry failed: {e}")))?;
            writer.write_all(&bytes)?;
        }
        let cursor = writer
            .finish()
            .map_err(|e| SnapreelError::EncoderFailure(format!("ZIP finalize failed: {e}")))?;

        Ok(Artifact {
            file_name: archive_file_name(&request.base_name),
            bytes: cursor.into_inner(),
        })
    }
}
