//! Paginated document export.
//!
//! [`DocumentEncoder`] lays every captured frame onto its own PDF page at
//! full bleed. Pages take their physical size from the media's pixel
//! dimensions at a fixed reference density of 96 px/inch, so a 1920×1080
//! video yields landscape pages with the exact source aspect ratio. Each
//! page carries a 1-based index label in the lower-right corner.

use async_trait::async_trait;
use printpdf::{
    BuiltinFont, Color, ColorBits, ColorSpace, Image, ImageTransform, Mm, PdfDocument, Px, Rgb,
};

use crate::encode::{Artifact, ExportFormat, ExportRequest, FrameEncoder, document_file_name};
use crate::encode::ensure_non_empty;
use crate::error::SnapreelError;

/// Reference pixel density used to convert pixels to physical units.
pub const REFERENCE_DPI: f32 = 96.0;

/// Label font size in points.
const LABEL_FONT_SIZE: f32 = 12.0;

/// Label inset from the right page edge, in millimetres.
const LABEL_INSET_RIGHT_MM: f32 = 30.0;

/// Label height above the bottom page edge, in millimetres.
const LABEL_INSET_BOTTOM_MM: f32 = 10.0;

/// Page orientation, decided once from the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Portrait,
    Landscape,
}

fn orientation(width: u32, height: u32) -> Orientation {
    if width > height {
        Orientation::Landscape
    } else {
        Orientation::Portrait
    }
}

/// Convert a pixel length to millimetres at [`REFERENCE_DPI`].
pub fn px_to_mm(px: u32) -> f32 {
    (px as f32 / REFERENCE_DPI) * 25.4
}

/// Encodes a frame sequence as a multi-page PDF document.
#[derive(Debug, Default)]
pub struct DocumentEncoder;

impl DocumentEncoder {
    /// Create the encoder.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FrameEncoder for DocumentEncoder {
    fn format(&self) -> ExportFormat {
        ExportFormat::Document
    }

    async fn encode(&self, request: &ExportRequest) -> Result<Artifact, SnapreelError> {
        ensure_non_empty(&request.frames)?;

        let page_width = Mm(px_to_mm(request.media_width));
        let page_height = Mm(px_to_mm(request.media_height));

        let first = request.frames.frames()[0]
            .decode()
            .map_err(|_| SnapreelError::MalformedFramePayload { index: 0 })?;
        log::debug!(
            "Encoding {} pages of {page_width:?} x {page_height:?} ({:?})",
            request.frames.len(),
            orientation(first.width(), first.height()),
        );

        let (doc, first_page, first_layer) =
            PdfDocument::new(&request.base_name, page_width, page_height, "frame");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| SnapreelError::EncoderFailure(format!("PDF font setup failed: {e}")))?;

        for (index, payload) in request.frames.frames().iter().enumerate() {
            let image = if index == 0 {
                first.clone()
            } else {
                payload
                    .decode()
                    .map_err(|_| SnapreelError::MalformedFramePayload { index })?
            };

            let (page, layer) = if index == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(page_width, page_height, "frame")
            };
            let layer = doc.get_page(page).get_layer(layer);

            // Frames may have been downscaled by the transform stage; the
            // transform scale factor stretches them back to full bleed.
            let rgb = image.to_rgb8();
            let (width, height) = rgb.dimensions();
            let xobject = printpdf::ImageXObject {
                width: Px(width as usize),
                height: Px(height as usize),
                color_space: ColorSpace::Rgb,
                bits_per_component: ColorBits::Bit8,
                interpolate: true,
                image_data: rgb.into_raw(),
                image_filter: None,
                clipping_bbox: None,
                smask: None,
            };
            Image::from(xobject).add_to_layer(
                layer.clone(),
                ImageTransform {
                    translate_x: Some(Mm(0.0)),
                    translate_y: Some(Mm(0.0)),
                    dpi: Some(REFERENCE_DPI),
                    scale_x: Some(request.media_width as f32 / width as f32),
                    scale_y: Some(request.media_height as f32 / height as f32),
                    ..Default::default()
                },
            );

            layer.set_fill_color(Color::Rgb(Rgb::new(0.39, 0.39, 0.39, None)));
            layer.use_text(
                format!("Page {}", index + 1),
                LABEL_FONT_SIZE,
                Mm(page_width.0 - LABEL_INSET_RIGHT_MM),
                Mm(LABEL_INSET_BOTTOM_MM),
                &font,
            );
        }

        let bytes = doc
            .save_to_bytes()
            .map_err(|e| SnapreelError::EncoderFailure(format!("PDF render failed: {e}")))?;

        Ok(Artifact {
            file_name: document_file_name(&request.base_name),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn px_to_mm_at_reference_density() {
        // 96 px is exactly one inch.
        assert!((px_to_mm(96) - 25.4).abs() < 1e-4);
        assert!((px_to_mm(1920) - 508.0).abs() < 0.1);
    }

    #[test]
    fn orientation_follows_aspect() {
        assert_eq!(orientation(1920, 1080), Orientation::Landscape);
        assert_eq!(orientation(1080, 1920), Orientation::Portrait);
        // Square media is treated as portrait.
        assert_eq!(orientation(512, 512), Orientation::Portrait);
    }
}
