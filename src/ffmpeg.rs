//! FFmpeg-backed media source.
//!
//! [`FfmpegSource`] implements [`MediaSource`] on top of the `ffmpeg-next`
//! demuxer: it opens a container, locates the best video stream, and
//! serves seek-then-rasterize requests by seeking to the nearest keyframe
//! before the target and decoding forward until the requested position is
//! reached. Decoded frames are scaled to RGB24 at the stream's native
//! dimensions, so rasterized payloads track the source's intrinsic
//! resolution.
//!
//! Only available with the `ffmpeg` feature; the FFmpeg development
//! libraries must be installed on the system.

use std::path::Path;

use async_trait::async_trait;
use ffmpeg_next::{
    Rational,
    codec::context::Context as CodecContext,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::error::SnapreelError;
use crate::frame::FramePayload;
use crate::source::{MediaSource, SourceDescriptor};

/// A video file opened through FFmpeg.
///
/// # Example
///
/// ```no_run
/// use snapreel::ffmpeg::FfmpegSource;
///
/// let source = FfmpegSource::open("input.mp4")?;
/// println!(
///     "{}s of {}x{} video",
///     source.descriptor().duration,
///     source.descriptor().width,
///     source.descriptor().height,
/// );
/// # Ok::<(), snapreel::SnapreelError>(())
/// ```
pub struct FfmpegSource {
    input_context: Input,
    descriptor: SourceDescriptor,
    video_stream_index: usize,
    time_base: Rational,
    current_frame: Option<DynamicImage>,
}

impl std::fmt::Debug for FfmpegSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegSource")
            .field("descriptor", &self.descriptor)
            .field("video_stream_index", &self.video_stream_index)
            .field("has_current_frame", &self.current_frame.is_some())
            .finish_non_exhaustive()
    }
}

impl FfmpegSource {
    /// Open a media file as a capture source.
    ///
    /// Initializes FFmpeg (idempotent), opens the container, and locates
    /// the best video stream.
    ///
    /// # Errors
    ///
    /// - [`SnapreelError::SourceOpen`] if the file cannot be opened.
    /// - [`SnapreelError::InvalidMediaType`] if the container holds no
    ///   video stream — a text file or bare audio track is rejected here,
    ///   before any pipeline work starts.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SnapreelError> {
        let path = path.as_ref();
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        ffmpeg_next::init().map_err(|error| SnapreelError::SourceOpen {
            path: path.to_path_buf(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| SnapreelError::SourceOpen {
                path: path.to_path_buf(),
                reason: error.to_string(),
            })?;

        let video_stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or_else(|| SnapreelError::InvalidMediaType {
                name: display_name.clone(),
            })?;
        let video_stream_index = video_stream.index();
        let time_base = video_stream.time_base();

        let decoder_context = CodecContext::from_parameters(video_stream.parameters())
            .map_err(|error| SnapreelError::SourceOpen {
                path: path.to_path_buf(),
                reason: format!("Failed to read video codec parameters: {error}"),
            })?;
        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| SnapreelError::SourceOpen {
                path: path.to_path_buf(),
                reason: format!("Failed to create video decoder: {error}"),
            })?;

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            duration_microseconds as f64 / f64::from(ffmpeg_sys_next::AV_TIME_BASE)
        } else {
            0.0
        };

        let descriptor = SourceDescriptor {
            name: display_name,
            duration,
            width: decoder.width(),
            height: decoder.height(),
        };
        log::debug!("Opened {descriptor:?}");

        Ok(Self {
            input_context,
            descriptor,
            video_stream_index,
            time_base,
            current_frame: None,
        })
    }

    /// Seek the demuxer and decode forward to the frame at `timestamp`.
    fn decode_at(&mut self, timestamp: f64) -> Result<DynamicImage, SnapreelError> {
        let stream = self
            .input_context
            .stream(self.video_stream_index)
            .ok_or_else(|| SnapreelError::FrameDecode("video stream disappeared".to_string()))?;
        let decoder_context = CodecContext::from_parameters(stream.parameters())?;
        let mut decoder = decoder_context.decoder().video()?;

        let width = self.descriptor.width;
        let height = self.descriptor.height;
        let mut scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;

        // Seek to the nearest keyframe at or before the target, then decode
        // forward until the target position is reached.
        let target = seconds_to_stream_timestamp(timestamp, self.time_base);
        self.input_context.seek(target, ..target)?;

        let mut decoded_frame = VideoFrame::empty();
        let mut rgb_frame = VideoFrame::empty();
        let stream_index = self.video_stream_index;
        let time_base = self.time_base;

        for (stream, packet) in self.input_context.packets() {
            if stream.index() != stream_index {
                continue;
            }

            decoder.send_packet(&packet)?;
            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                let pts = decoded_frame.pts().unwrap_or(0);
                if pts_to_seconds(pts, time_base) >= timestamp {
                    scaler.run(&decoded_frame, &mut rgb_frame)?;
                    return frame_to_image(&rgb_frame, width, height);
                }
            }
        }

        // Flush: the target may sit in the decoder's tail.
        decoder.send_eof()?;
        if decoder.receive_frame(&mut decoded_frame).is_ok() {
            scaler.run(&decoded_frame, &mut rgb_frame)?;
            return frame_to_image(&rgb_frame, width, height);
        }

        Err(SnapreelError::FrameDecode(format!(
            "No decodable frame at {timestamp}s"
        )))
    }
}

#[async_trait]
impl MediaSource for FfmpegSource {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    async fn seek(&mut self, timestamp: f64) -> Result<(), SnapreelError> {
        let image = self.decode_at(timestamp)?;
        self.current_frame = Some(image);
        Ok(())
    }

    fn rasterize(&mut self) -> Result<FramePayload, SnapreelError> {
        let image = self
            .current_frame
            .as_ref()
            .ok_or_else(|| SnapreelError::FrameDecode("rasterize before seek".to_string()))?;
        FramePayload::from_image(image)
    }
}

/// Convert seconds to a timestamp in the stream's time base.
fn seconds_to_stream_timestamp(seconds: f64, time_base: Rational) -> i64 {
    let numerator = f64::from(time_base.numerator());
    let denominator = f64::from(time_base.denominator());
    (seconds * denominator / numerator) as i64
}

/// Rescale a PTS value from stream time base to seconds.
fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * f64::from(time_base.numerator()) / f64::from(time_base.denominator())
}

/// Copy an RGB24 frame into an [`image::DynamicImage`].
///
/// FFmpeg frames frequently carry per-row padding (stride > width × 3);
/// the padded rows are stripped before the buffer is handed to `image`.
fn frame_to_image(
    frame: &VideoFrame,
    width: u32,
    height: u32,
) -> Result<DynamicImage, SnapreelError> {
    let stride = frame.stride(0);
    let row_bytes = width as usize * 3;
    let data = frame.data(0);

    let buffer = if stride == row_bytes {
        data[..row_bytes * height as usize].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let start = row * stride;
            buffer.extend_from_slice(&data[start..start + row_bytes]);
        }
        buffer
    };

    RgbImage::from_raw(width, height, buffer)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| {
            SnapreelError::FrameDecode("frame buffer does not match dimensions".to_string())
        })
}
