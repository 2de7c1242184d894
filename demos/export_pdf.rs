//! Export sampled frames as a multi-page PDF document.
//!
//! Usage: `cargo run --features ffmpeg --example export_pdf -- path/to/video.mp4`

use snapreel::ffmpeg::FfmpegSource;
use snapreel::{
    ArtifactSink, DirectorySink, ExportFormat, ExportSettings, Pipeline, SamplingParameters,
    SnapreelError,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), SnapreelError> {
    let path = std::env::args()
        .nth(1)
        .expect("Usage: export_pdf <video_path>");

    let source = FfmpegSource::open(&path)?;
    let duration = source.descriptor().duration;
    println!(
        "Input: {}x{}, {duration:.2}s",
        source.descriptor().width,
        source.descriptor().height,
    );

    let mut pipeline = Pipeline::new();
    pipeline.load_source(Box::new(source))?;

    // One page every 5 seconds across the whole timeline.
    let settings = ExportSettings::new(
        ExportFormat::Document,
        SamplingParameters::new(0.0, 5.0, duration),
    );

    let artifact = pipeline.export(&settings).await?;
    DirectorySink::new(".").deliver(&artifact)?;
    println!("PDF saved to {}", artifact.file_name);

    Ok(())
}
