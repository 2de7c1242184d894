//! Export sampled frames as an animated GIF loop.
//!
//! Usage: `cargo run --features ffmpeg --example export_gif -- path/to/video.mp4`

use snapreel::ffmpeg::FfmpegSource;
use snapreel::{
    ArtifactSink, DirectorySink, ExportFormat, ExportSettings, Pipeline, SamplingParameters,
    SnapreelError,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), SnapreelError> {
    let path = std::env::args()
        .nth(1)
        .expect("Usage: export_gif <video_path>");

    let source = FfmpegSource::open(&path)?;
    let duration = source.descriptor().duration;
    println!(
        "Input: {}x{}, {duration:.2}s",
        source.descriptor().width,
        source.descriptor().height,
    );

    let mut pipeline = Pipeline::new();
    pipeline.load_source(Box::new(source))?;

    // One frame every 2 seconds, 250 ms per frame, lightly compressed.
    let settings = ExportSettings::new(
        ExportFormat::Loop,
        SamplingParameters::new(0.0, 2.0, duration),
    )
    .with_compression_ratio(80)
    .with_loop_frame_delay(250);

    let artifact = pipeline.export(&settings).await?;
    println!("GIF in memory: {} bytes", artifact.bytes.len());

    DirectorySink::new(".").deliver(&artifact)?;
    println!("GIF saved to {}", artifact.file_name);

    Ok(())
}
