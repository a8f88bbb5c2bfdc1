//! Local audio transcoding
//!
//! The [`Transcoder`] trait is the seam between the worker and whatever does
//! the conversion; [`FfmpegTranscoder`] drives the external `ffmpeg` binary.

mod ffmpeg;

pub use ffmpeg::FfmpegTranscoder;

use async_trait::async_trait;
use std::path::Path;

/// Converts a local audio file into the target format
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Convert `input` and write the result to `output`, replacing any existing file
    ///
    /// # Errors
    ///
    /// Returns an error if the input is malformed or the conversion fails.
    async fn transcode(&self, input: &Path, output: &Path) -> crate::Result<()>;

    /// File extension of the produced files, without the dot
    fn extension(&self) -> &'static str;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
