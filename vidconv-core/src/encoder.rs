//! The encoder seam: "load a video, write it again with the given codec".

use anyhow::Result;
use std::path::Path;

use crate::{ConverterConfig, FFmpegCommand};

/// Writes `input` to `output` re-encoded with `codec`.
///
/// `codec` and `muxer` are `None` when the requested format is unknown; the
/// encoder is expected to fail on its own rather than guess.
pub trait Encoder: Send + Sync {
    fn encode(
        &self,
        input: &Path,
        output: &Path,
        codec: Option<&str>,
        muxer: Option<&str>,
        progress: &mut dyn FnMut(f64),
    ) -> Result<()>;
}

/// Encoder backed by the `ffmpeg` executable.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    config: ConverterConfig,
}

impl FfmpegEncoder {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn command(
        &self,
        input: &Path,
        output: &Path,
        codec: Option<&str>,
        muxer: Option<&str>,
    ) -> FFmpegCommand {
        let mut cmd = FFmpegCommand::new(input, output)
            .program(&self.config.ffmpeg_path)
            .overwrite();

        if let Some(codec) = codec {
            cmd = cmd.video_codec(codec);
        }
        if let Some(muxer) = muxer {
            cmd = cmd.format(muxer);
        }
        if let Some(threads) = self.config.threads {
            cmd = cmd.threads(threads);
        }
        cmd
    }
}

impl Encoder for FfmpegEncoder {
    fn encode(
        &self,
        input: &Path,
        output: &Path,
        codec: Option<&str>,
        muxer: Option<&str>,
        progress: &mut dyn FnMut(f64),
    ) -> Result<()> {
        // Without a codec FFmpeg would guess one from the extension.
        let codec = codec.ok_or_else(|| anyhow::anyhow!("No codec found for the selected format"))?;
        self.command(input, output, Some(codec), muxer)
            .execute(|percent| progress(percent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_uses_configured_binary_and_threads() {
        let encoder = FfmpegEncoder::new(
            ConverterConfig::default()
                .ffmpeg_path("/opt/ffmpeg")
                .threads(3),
        );
        let cmd = encoder
            .command(
                Path::new("clip.mov"),
                Path::new("clip.webm"),
                Some("libvpx"),
                Some("webm"),
            )
            .build();

        assert_eq!(cmd.get_program(), "/opt/ffmpeg");
        let args: Vec<_> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert!(args.windows(2).any(|w| w == ["-c:v", "libvpx"]));
        assert!(args.windows(2).any(|w| w == ["-threads", "3"]));
        assert!(args.windows(2).any(|w| w == ["-f", "webm"]));
    }

    #[test]
    fn unknown_codec_fails_without_spawning() {
        let encoder = FfmpegEncoder::new(ConverterConfig::default().ffmpeg_path("/nonexistent/ffmpeg"));
        let err = encoder
            .encode(
                Path::new("a.mov"),
                Path::new("b.out"),
                None,
                None,
                &mut |_| {},
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "No codec found for the selected format");
    }
}
