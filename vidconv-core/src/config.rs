use std::path::{Path, PathBuf};

/// Settings shared by every conversion a front end starts.
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// FFmpeg executable, looked up on PATH when not absolute
    pub ffmpeg_path: PathBuf,
    /// FFprobe executable, used for input metadata only
    pub ffprobe_path: PathBuf,
    /// Directory holding temporary encoder output
    pub temp_dir: PathBuf,
    /// Encoder thread count; FFmpeg decides when unset
    pub threads: Option<usize>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            temp_dir: std::env::temp_dir(),
            threads: None,
        }
    }
}

impl ConverterConfig {
    pub fn ffmpeg_path(mut self, path: impl AsRef<Path>) -> Self {
        self.ffmpeg_path = path.as_ref().to_path_buf();
        self
    }

    pub fn ffprobe_path(mut self, path: impl AsRef<Path>) -> Self {
        self.ffprobe_path = path.as_ref().to_path_buf();
        self
    }

    pub fn temp_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.temp_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn threads(mut self, count: usize) -> Self {
        self.threads = Some(count);
        self
    }
}
