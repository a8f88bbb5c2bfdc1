//! MP3 transcoding through the external ffmpeg binary

use super::Transcoder;
use crate::error::Error;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Transcoder that shells out to `ffmpeg` with the LAME MP3 encoder
pub struct FfmpegTranscoder {
    binary_path: PathBuf,
    bitrate: Option<String>,
}

impl FfmpegTranscoder {
    /// Create a new transcoder with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            bitrate: None,
        }
    }

    /// Attempt to find ffmpeg in PATH
    pub fn from_path() -> Option<Self> {
        which::which("ffmpeg").ok().map(Self::new)
    }

    /// Encode at a fixed bitrate such as "192k" instead of the encoder default
    pub fn with_bitrate(mut self, bitrate: Option<String>) -> Self {
        self.bitrate = bitrate;
        self
    }

    fn build_args(&self, input: &Path, output: &Path) -> Vec<std::ffi::OsString> {
        let mut args: Vec<std::ffi::OsString> = vec![
            "-hide_banner".into(),
            "-nostdin".into(),
            "-loglevel".into(),
            "error".into(),
            "-y".into(),
            "-i".into(),
            input.as_os_str().to_owned(),
            "-vn".into(),
            "-codec:a".into(),
            "libmp3lame".into(),
        ];
        if let Some(bitrate) = &self.bitrate {
            args.push("-b:a".into());
            args.push(bitrate.into());
        }
        args.push(output.as_os_str().to_owned());
        args
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> crate::Result<()> {
        let args = self.build_args(input, output);
        tracing::debug!(binary = ?self.binary_path, ?input, ?output, "running ffmpeg");

        let result = Command::new(&self.binary_path)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::ExternalTool(format!("Failed to execute ffmpeg: {}", e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(Error::ExternalTool(format!(
                "ffmpeg exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "mp3"
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}
