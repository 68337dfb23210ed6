#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod messages;
mod theme;
mod view;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use app::{MainWindow, WINDOW_TITLE};
use theme::{MINIMUM_WIDTH, Theme};
use vidconv_core::{ConverterConfig, check_ffmpeg};

#[derive(Parser, Debug)]
#[command(name = "vidconv-gui")]
#[command(about = "Desktop video converter")]
#[command(version)]
struct Args {
    /// FFmpeg executable used for conversions
    #[arg(long, env = "VIDCONV_FFMPEG", default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// Directory for temporary encoder output
    #[arg(long, env = "VIDCONV_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// Number of encoder threads
    #[arg(short, long)]
    threads: Option<usize>,

    /// Color theme
    #[arg(long, value_enum, default_value = "dark")]
    theme: Theme,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> ConverterConfig {
        let mut config = ConverterConfig::default().ffmpeg_path(&self.ffmpeg);
        if let Some(ref dir) = self.temp_dir {
            config = config.temp_dir(dir);
        }
        if let Some(threads) = self.threads {
            config = config.threads(threads);
        }
        config
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    log::info!("Starting {} v{}", WINDOW_TITLE, env!("CARGO_PKG_VERSION"));

    // The window still opens without FFmpeg; conversions then fail with the reason
    match check_ffmpeg(&args.ffmpeg) {
        Ok(version) => log::info!("FFmpeg version {} detected", version),
        Err(e) => log::warn!("{:#}", e),
    }

    let config = args.config();
    let theme = args.theme;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([MINIMUM_WIDTH, 420.0])
            .with_min_inner_size([MINIMUM_WIDTH, 320.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        native_options,
        Box::new(move |cc| Box::new(MainWindow::new(cc, &config, theme))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to open the main window: {e}"))
}
