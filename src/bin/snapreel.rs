use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use snapreel::ffmpeg::FfmpegSource;
use snapreel::{
    ArtifactSink, DirectorySink, ExportFormat, ExportSettings, Pipeline, ProgressSink,
    ProgressUpdate, SamplingParameters, archive_file_name, document_file_name, loop_file_name,
};

const CLI_AFTER_HELP: &str = "Examples:\n  snapreel export input.mp4 --format pdf --step 5 --out exports --progress\n  snapreel export input.mp4 --format gif --step 2 --delay 250 --compression 60\n  snapreel export input.mp4 --format zip --start 0:00:10 --end 0:01:00\n  snapreel metadata input.mp4 --json\n  snapreel completions zsh > _snapreel";

#[derive(Debug, Parser)]
#[command(
    name = "snapreel",
    version,
    about = "Sample video frames and export them as a PDF, GIF, or ZIP",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// Show a progress bar where supported.
    #[arg(long)]
    progress: bool,

    /// Allow overwriting existing output files.
    #[arg(long)]
    overwrite: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sample frames and export an artifact.
    #[command(
        about = "Export sampled frames as pdf, gif, or zip",
        after_help = "Examples:\n  snapreel export input.mp4 --format pdf --step 5\n  snapreel export input.mp4 --format gif --start 10 --end 30 --delay 250"
    )]
    Export {
        /// Input video path.
        input: PathBuf,
        /// Output format: pdf | gif | zip.
        #[arg(long)]
        format: String,
        /// First sample time (seconds or [HH:]MM:SS).
        #[arg(long)]
        start: Option<String>,
        /// Exclusive end of the sample window (seconds or [HH:]MM:SS).
        /// Defaults to the full duration.
        #[arg(long)]
        end: Option<String>,
        /// Seconds between samples.
        #[arg(long, default_value_t = 5.0)]
        step: f64,
        /// Compression ratio in percent (1-100; 100 keeps frames untouched).
        #[arg(long, default_value_t = 100)]
        compression: u8,
        /// Per-frame hold time for GIF output, in milliseconds.
        #[arg(long, default_value_t = 500)]
        delay: u32,
        /// Output directory for the artifact.
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Print metadata for a media file (alias: probe).
    #[command(
        about = "Print media metadata",
        visible_alias = "probe",
        visible_alias = "info",
        after_help = "Examples:\n  snapreel metadata input.mp4\n  snapreel metadata input.mp4 --json"
    )]
    Metadata {
        /// Input video path.
        input: PathBuf,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_timecode(value: &str) -> Result<f64, Box<dyn std::error::Error>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("time value cannot be empty".into());
    }

    if let Ok(seconds) = trimmed.parse::<f64>() {
        return Ok(seconds.max(0.0));
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(format!("invalid time format: {trimmed}").into());
    }

    let (hours, minutes, seconds_str) = if parts.len() == 3 {
        (parts[0].parse::<u64>()?, parts[1].parse::<u64>()?, parts[2])
    } else {
        (0_u64, parts[0].parse::<u64>()?, parts[1])
    };

    let seconds = seconds_str.parse::<f64>()?;
    let total_seconds = (hours as f64 * 3600.0) + (minutes as f64 * 60.0) + seconds;
    Ok(total_seconds.max(0.0))
}

fn expected_file_name(format: ExportFormat, base_name: &str) -> String {
    match format {
        ExportFormat::Document => document_file_name(base_name),
        ExportFormat::Loop => loop_file_name(base_name),
        ExportFormat::Archive => archive_file_name(base_name),
    }
}

fn ensure_writable_path(
    path: &std::path::Path,
    overwrite: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    Ok(())
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(100);
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {percent}% {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        bar.enable_steady_tick(Duration::from_millis(120));
        Ok(Self { bar })
    }
}

impl ProgressSink for TerminalProgress {
    fn on_progress(&self, update: &ProgressUpdate) {
        self.bar.set_message(update.message);
        match update.percent {
            Some(percent) => self.bar.set_position(u64::from(percent)),
            None => self.bar.set_position(0),
        }
    }

    fn on_clear(&self) {
        self.bar.finish_and_clear();
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            input,
            format,
            start,
            end,
            step,
            compression,
            delay,
            out,
        } => {
            let format = ExportFormat::parse(&format)
                .ok_or(format!("unsupported --format: {format} (pdf|gif|zip)"))?;

            let source = FfmpegSource::open(&input)?;
            let duration = source.descriptor().duration;
            let base_name = source.descriptor().base_name().to_string();

            if cli.global.verbose {
                eprintln!(
                    "{} {} ({duration:.2}s, {}x{})",
                    "source:".cyan().bold(),
                    source.descriptor().name,
                    source.descriptor().width,
                    source.descriptor().height,
                );
            }

            let sink = DirectorySink::new(&out);
            let target = sink.path_for(&expected_file_name(format, &base_name));
            ensure_writable_path(&target, cli.global.overwrite)?;

            let start = start.as_deref().map(parse_timecode).transpose()?.unwrap_or(0.0);
            let end = end.as_deref().map(parse_timecode).transpose()?.unwrap_or(duration);

            let mut pipeline = Pipeline::new();
            if cli.global.progress {
                pipeline = pipeline.with_progress(Arc::new(TerminalProgress::new()?));
            }
            pipeline.load_source(Box::new(source))?;

            let settings =
                ExportSettings::new(format, SamplingParameters::new(start, step, end))
                    .with_compression_ratio(compression)
                    .with_loop_frame_delay(delay);

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()?;
            let artifact = runtime.block_on(pipeline.export(&settings))?;

            sink.deliver(&artifact)?;
            println!(
                "{} {}",
                "saved".green().bold(),
                sink.path_for(&artifact.file_name).display()
            );
        }
        Commands::Metadata { input, json } => {
            let source = FfmpegSource::open(&input)?;
            let descriptor = source.descriptor();
            if json {
                let payload = json!({
                    "name": descriptor.name,
                    "base_name": descriptor.base_name(),
                    "duration_seconds": descriptor.duration,
                    "width": descriptor.width,
                    "height": descriptor.height,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Name: {}", descriptor.name);
                println!("Duration: {:.2}s", descriptor.duration);
                println!("Video: {}x{}", descriptor.width, descriptor.height);
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "snapreel", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
