//! Animated loop export.
//!
//! [`LoopEncoder`] assembles the captured frames into a single animated
//! GIF. The canvas takes its dimensions from the first frame that decodes
//! successfully; later frames are resampled to match if the transform
//! stage changed their size. Every frame holds for the same
//! caller-supplied delay.
//!
//! Frame decoding is best-effort: a frame that fails to decode is logged
//! and skipped rather than aborting the export, since a partial loop is
//! more useful than none.

use async_trait::async_trait;
use gif::{Encoder, Frame, Repeat};
use image::{DynamicImage, imageops::FilterType};

use crate::encode::{Artifact, ExportFormat, ExportRequest, FrameEncoder, loop_file_name};
use crate::encode::ensure_non_empty;
use crate::error::SnapreelError;

/// Palette quantization speed, 1 (best) to 30 (fastest).
const QUANTIZER_SPEED: i32 = 10;

/// Encodes a frame sequence as an infinitely repeating GIF.
#[derive(Debug, Default)]
pub struct LoopEncoder;

impl LoopEncoder {
    /// Create the encoder.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FrameEncoder for LoopEncoder {
    fn format(&self) -> ExportFormat {
        ExportFormat::Loop
    }

    async fn encode(&self, request: &ExportRequest) -> Result<Artifact, SnapreelError> {
        ensure_non_empty(&request.frames)?;

        log::debug!(
            "Encoding {} frames to GIF (delay {}ms)",
            request.frames.len(),
            request.loop_frame_delay_ms,
        );

        // Decode pass. Bad frames are dropped here, not surfaced.
        let mut decoded: Vec<DynamicImage> = Vec::with_capacity(request.frames.len());
        let mut canvas: Option<(u32, u32)> = None;
        for (index, payload) in request.frames.frames().iter().enumerate() {
            match payload.decode() {
                Ok(image) => {
                    let (width, height) = *canvas.get_or_insert((image.width(), image.height()));
                    if image.width() == width && image.height() == height {
                        decoded.push(image);
                    } else {
                        decoded.push(image.resize_exact(width, height, FilterType::Triangle));
                    }
                }
                Err(error) => {
                    log::warn!("Skipping undecodable frame {index} in GIF export: {error}");
                }
            }
        }

        let Some((width, height)) = canvas else {
            return Err(SnapreelError::EncoderFailure(
                "no frame in the sequence could be decoded".to_string(),
            ));
        };
        let (width, height) = (width as u16, height as u16);

        // Delay is in hundredths of a second; never let it round to zero.
        let delay = ((request.loop_frame_delay_ms / 10).max(1) as u64).min(u64::from(u16::MAX)) as u16;

        let mut buffer = Vec::new();
        {
            let mut encoder = Encoder::new(&mut buffer, width, height, &[]).map_err(|e| {
                SnapreelError::EncoderFailure(format!("Failed to create GIF encoder: {e}"))
            })?;
            encoder.set_repeat(Repeat::Infinite).map_err(|e| {
                SnapreelError::EncoderFailure(format!("Failed to set GIF repeat: {e}"))
            })?;

            for image in &decoded {
                let rgba = image.to_rgba8();
                let mut pixels = rgba.into_raw();

                let mut gif_frame =
                    Frame::from_rgba_speed(width, height, &mut pixels, QUANTIZER_SPEED);
                gif_frame.delay = delay;

                encoder.write_frame(&gif_frame).map_err(|e| {
                    SnapreelError::EncoderFailure(format!("Failed to write GIF frame: {e}"))
                })?;
            }
        }

        Ok(Artifact {
            file_name: loop_file_name(&request.base_name),
            bytes: buffer,
        })
    }
}
