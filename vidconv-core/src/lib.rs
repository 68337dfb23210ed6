//! Vidconv Core - video format conversion through the FFmpeg CLI
//!
//! This library provides the pieces shared by the desktop and command-line
//! front ends:
//! - A fixed table of output formats and the codec each one maps to
//! - A conversion worker that encodes into a temporary file and only then
//!   delivers the result to the requested path
//! - A background runner that allows one conversion at a time and reports
//!   progress and outcome over a channel

pub mod background;
pub mod config;
pub mod encoder;
pub mod error;
pub mod ffmpeg_wrapper;
pub mod formats;
pub mod temp;
pub mod worker;

// Re-export commonly used types at the crate root
pub use background::{BackgroundConverter, ConversionEvent, JobId, WorkerState};
pub use config::ConverterConfig;
pub use encoder::{Encoder, FfmpegEncoder};
pub use error::ConvertError;
pub use ffmpeg_wrapper::{FFmpegCommand, VideoInfo, check_ffmpeg, get_video_info};
pub use formats::FormatEntry;
pub use worker::{ConversionOutcome, ConversionRequest, convert};
