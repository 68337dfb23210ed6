use anyhow::{Context, Result};
use regex::{Captures, Regex};
use serde::Deserialize;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::LazyLock;
use std::sync::mpsc;
use std::thread;

static DURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Duration: (\d{2}):(\d{2}):(\d{2})\.(\d{2})").expect("valid duration regex")
});
static PROGRESS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"time=(\d{2}):(\d{2}):(\d{2})\.(\d{2})").expect("valid progress regex")
});
static VERSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ffmpeg version (\S+)").expect("valid version regex"));

/// FFmpeg command builder with fluent interface
#[derive(Debug, Clone)]
pub struct FFmpegCommand {
    program: PathBuf,
    input: PathBuf,
    output: PathBuf,
    video_codec: Option<String>,
    format: Option<String>,
    threads: Option<usize>,
    overwrite: bool,
    extra_args: Vec<String>,
}

impl FFmpegCommand {
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            video_codec: None,
            format: None,
            threads: None,
            overwrite: false,
            extra_args: Vec::new(),
        }
    }

    /// Use a specific FFmpeg executable
    pub fn program(mut self, program: impl AsRef<Path>) -> Self {
        self.program = program.as_ref().to_path_buf();
        self
    }

    /// Set video codec
    pub fn video_codec(mut self, codec: &str) -> Self {
        self.video_codec = Some(codec.to_string());
        self
    }

    /// Force the output container muxer
    pub fn format(mut self, muxer: &str) -> Self {
        self.format = Some(muxer.to_string());
        self
    }

    /// Set number of threads
    pub fn threads(mut self, count: usize) -> Self {
        self.threads = Some(count);
        self
    }

    /// Enable overwrite without asking
    pub fn overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }

    /// Add custom FFmpeg arguments
    pub fn custom_args(mut self, args: Vec<String>) -> Self {
        self.extra_args.extend(args);
        self
    }

    /// Build the FFmpeg command
    pub fn build(&self) -> Command {
        let mut cmd = Command::new(&self.program);

        cmd.args(["-hide_banner", "-nostdin"]);
        if self.overwrite {
            cmd.arg("-y");
        }

        cmd.arg("-i").arg(&self.input);

        if let Some(ref codec) = self.video_codec {
            cmd.args(["-c:v", codec]);
        }

        if let Some(threads) = self.threads {
            cmd.args(["-threads", &threads.to_string()]);
        }

        for arg in &self.extra_args {
            cmd.arg(arg);
        }

        if let Some(ref muxer) = self.format {
            cmd.args(["-f", muxer]);
        }

        cmd.arg(&self.output);

        cmd
    }

    /// Execute the FFmpeg command, reporting percent complete as it runs.
    ///
    /// The callback runs on the calling thread.
    pub fn execute<F>(&self, mut progress_callback: F) -> Result<()>
    where
        F: FnMut(f64),
    {
        let mut cmd = self.build();
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        log::info!(
            "Encoding {:?} -> {:?} with codec {}",
            self.input,
            self.output,
            self.video_codec.as_deref().unwrap_or("<default>")
        );
        log::debug!("Raw command: {:?}", cmd);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn FFmpeg process {:?}", self.program))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow::anyhow!("Failed to capture stderr"))?;

        let (tx, rx) = mpsc::channel();

        // Reader thread parses progress and keeps the tail of the output
        let reader_thread = thread::spawn(move || scan_stderr(BufReader::new(stderr), &tx));

        while let Ok(progress) = rx.recv() {
            progress_callback(progress);
        }

        let last_line = reader_thread
            .join()
            .unwrap_or_else(|_| String::from("Failed to read FFmpeg output"));

        let status = child.wait().context("Failed to wait for FFmpeg process")?;

        if !status.success() {
            log::error!("FFmpeg failed ({:?}): {}", status.code(), last_line);
            anyhow::bail!(
                "FFmpeg exited with code {:?}: {}",
                status.code(),
                last_line
            );
        }

        progress_callback(100.0);
        Ok(())
    }
}

/// Follow FFmpeg's stderr, sending percent complete as stats arrive.
///
/// Stats updates end in `\r` rather than `\n`, so both count as line ends.
/// Returns the last non-stats line, which holds the error on failure.
fn scan_stderr(reader: impl BufRead, tx: &mpsc::Sender<f64>) -> String {
    let mut total_duration: Option<f64> = None;
    let mut last_line = String::new();

    for chunk in reader.split(b'\r').map_while(Result::ok) {
        let chunk = String::from_utf8_lossy(&chunk);
        for line in chunk.split('\n') {
            if total_duration.is_none()
                && let Some(caps) = DURATION_REGEX.captures(line)
            {
                total_duration = Some(timestamp_seconds(&caps));
            }

            if let Some(caps) = PROGRESS_REGEX.captures(line) {
                if let Some(duration) = total_duration.filter(|d| *d > 0.0) {
                    let current = timestamp_seconds(&caps);
                    let _ = tx.send((current / duration * 100.0).min(100.0));
                }
            } else if !line.trim().is_empty() {
                log::trace!("ffmpeg: {}", line);
                last_line = line.trim().to_string();
            }
        }
    }
    last_line
}

fn timestamp_seconds(caps: &Captures<'_>) -> f64 {
    let hours: f64 = caps[1].parse().unwrap_or(0.0);
    let minutes: f64 = caps[2].parse().unwrap_or(0.0);
    let seconds: f64 = caps[3].parse().unwrap_or(0.0);
    let centis: f64 = caps[4].parse().unwrap_or(0.0);
    hours * 3600.0 + minutes * 60.0 + seconds + centis / 100.0
}

/// Check if FFmpeg is available and return version info
pub fn check_ffmpeg(program: impl AsRef<Path>) -> Result<String> {
    let output = Command::new(program.as_ref())
        .arg("-version")
        .output()
        .context("FFmpeg not found. Please install FFmpeg.")?;

    let version = String::from_utf8_lossy(&output.stdout);
    Ok(parse_version(&version).unwrap_or_else(|| "unknown".to_string()))
}

fn parse_version(banner: &str) -> Option<String> {
    VERSION_REGEX
        .captures(banner)
        .map(|caps| caps[1].to_string())
}

/// Video metadata reported by ffprobe
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub codec: String,
    pub has_audio: bool,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Get video metadata using ffprobe
pub fn get_video_info(ffprobe: impl AsRef<Path>, path: impl AsRef<Path>) -> Result<VideoInfo> {
    let output = Command::new(ffprobe.as_ref())
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path.as_ref())
        .output()
        .context("Failed to run ffprobe")?;

    if !output.status.success() {
        anyhow::bail!("ffprobe could not read {:?}", path.as_ref());
    }

    parse_probe_json(&String::from_utf8_lossy(&output.stdout))
}

fn parse_probe_json(json: &str) -> Result<VideoInfo> {
    let probe: ProbeOutput = serde_json::from_str(json).context("Invalid ffprobe output")?;

    let video = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| anyhow::anyhow!("No video stream found"))?;

    let fps = video
        .r_frame_rate
        .as_deref()
        .and_then(|rate| {
            let (num, den) = rate.split_once('/')?;
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            (den > 0.0).then(|| num / den)
        })
        .unwrap_or(0.0);

    let duration = probe
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse().ok())
        .unwrap_or(0.0);

    Ok(VideoInfo {
        duration,
        width: video.width.unwrap_or(0),
        height: video.height.unwrap_or(0),
        fps,
        codec: video
            .codec_name
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
        has_audio: probe
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some("audio")),
    })
}
