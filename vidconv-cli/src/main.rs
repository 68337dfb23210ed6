use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

use vidconv_core::formats;
use vidconv_core::{
    BackgroundConverter, ConversionEvent, ConversionOutcome, ConversionRequest, ConverterConfig,
    check_ffmpeg, get_video_info,
};

#[derive(Parser, Debug)]
#[command(name = "vidconv")]
#[command(about = "Convert a video to another container and codec using FFmpeg")]
#[command(version)]
struct Args {
    /// Input video file path
    #[arg(short, long, required_unless_present = "list_formats")]
    input: Option<PathBuf>,

    /// Output video file path
    #[arg(short, long, required_unless_present = "list_formats")]
    output: Option<PathBuf>,

    /// Output format label (see --list-formats)
    #[arg(short, long, default_value = "MP4")]
    format: String,

    /// List available output formats
    #[arg(long)]
    list_formats: bool,

    /// Print the format list as JSON
    #[arg(long, requires = "list_formats")]
    json: bool,

    /// FFmpeg executable
    #[arg(long, env = "VIDCONV_FFMPEG", default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// FFprobe executable, used to describe the input
    #[arg(long, env = "VIDCONV_FFPROBE", default_value = "ffprobe")]
    ffprobe: PathBuf,

    /// Directory for temporary encoder output
    #[arg(long, env = "VIDCONV_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// Number of threads for encoding
    #[arg(short, long)]
    threads: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> ConverterConfig {
        let mut config = ConverterConfig::default()
            .ffmpeg_path(&self.ffmpeg)
            .ffprobe_path(&self.ffprobe);
        if let Some(ref dir) = self.temp_dir {
            config = config.temp_dir(dir);
        }
        if let Some(threads) = self.threads {
            config = config.threads(threads);
        }
        config
    }
}

fn print_formats(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(formats::all())?);
        return Ok(());
    }

    println!("\nAvailable formats:");
    println!("{:-<40}", "");
    for entry in formats::all() {
        println!("{:<10} - {} (.{})", entry.label, entry.codec_id, entry.extension());
    }
    println!("\nUsage: vidconv -i input.mov -o output.webm --format WEBM");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    if args.list_formats {
        return print_formats(args.json);
    }

    if formats::lookup(&args.format).is_none() {
        anyhow::bail!(
            "Unknown format: {}. Use --list-formats to see available options.",
            args.format
        );
    }

    // Check FFmpeg availability
    match check_ffmpeg(&args.ffmpeg) {
        Ok(version) => {
            log::info!("FFmpeg version {} detected", version);
        }
        Err(e) => {
            eprintln!("Error: FFmpeg not found!");
            eprintln!("Please install FFmpeg to use this tool.");
            eprintln!();
            eprintln!("Installation instructions:");
            eprintln!("  Ubuntu/Debian: sudo apt install ffmpeg");
            eprintln!("  macOS:         brew install ffmpeg");
            eprintln!("  Windows:       Download from https://ffmpeg.org/download.html");
            eprintln!();
            eprintln!("Details: {:#}", e);
            std::process::exit(1);
        }
    }

    let config = args.config();

    // Both are required unless listing formats, so they exist here
    let input = args
        .input
        .ok_or_else(|| anyhow::anyhow!("Input file required"))?;
    let output = args
        .output
        .ok_or_else(|| anyhow::anyhow!("Output file required"))?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context("Failed to create output directory")?;
    }

    match get_video_info(&config.ffprobe_path, &input) {
        Ok(info) => log::info!(
            "Input: {}x{} {} at {:.2} fps, {:.2}s, audio: {}",
            info.width,
            info.height,
            info.codec,
            info.fps,
            info.duration,
            if info.has_audio { "yes" } else { "no" }
        ),
        Err(e) => log::debug!("Could not probe input: {:#}", e),
    }

    let converter = BackgroundConverter::from_config(&config);
    let job = converter.start(ConversionRequest::new(&args.format, &input, &output))?;

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message(format!("Converting to {}", args.format));
    pb.enable_steady_tick(Duration::from_millis(120));

    let outcome = loop {
        match converter.recv_timeout(Duration::from_millis(250)) {
            Some(ConversionEvent::Progress(id, percent)) if id == job => {
                pb.set_position(percent as u64)
            }
            Some(ConversionEvent::Finished(id, outcome)) if id == job => break outcome,
            Some(_) | None => {}
        }
    };

    match outcome {
        ConversionOutcome::Success(path) => {
            pb.finish_with_message("Conversion complete!");
            println!("\n✅ Conversion completed successfully!");
            println!("📁 Output saved to: {:?}", path);
            Ok(())
        }
        ConversionOutcome::Failure(message) => {
            pb.abandon_with_message("Conversion failed");
            anyhow::bail!("Conversion failed: {}", message)
        }
    }
}
