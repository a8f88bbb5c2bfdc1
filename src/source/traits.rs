//! Traits and types for remote media lookup

use crate::types::ItemId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One remote encoding of an item
#[derive(Debug, Clone, PartialEq)]
pub struct StreamHandle {
    /// Service-specific format identifier
    pub format_id: String,
    /// Direct URL of the encoding
    pub url: String,
    /// Container extension (e.g. "m4a", "webm")
    pub ext: String,
    /// Whether the encoding carries audio
    pub has_audio: bool,
    /// Whether the encoding carries video
    pub has_video: bool,
    /// Audio bitrate reported by the service, in kbps
    pub abr_kbps: Option<f64>,
    /// HTTP headers the service requires for the download
    pub http_headers: HashMap<String, String>,
}

impl StreamHandle {
    /// Whether this encoding is audio without video
    pub fn is_audio_only(&self) -> bool {
        self.has_audio && !self.has_video
    }

    /// Reported bitrate as shown in result lines, e.g. "160kbps"
    pub fn bitrate_label(&self) -> String {
        match self.abr_kbps {
            Some(abr) => format!("{}kbps", abr.round() as u64),
            None => "unknown".to_string(),
        }
    }
}

/// An opened remote item: its descriptive metadata and available encodings
#[derive(Debug, Clone)]
pub struct MediaHandle {
    /// Identifier that was opened
    pub identifier: ItemId,
    /// Display title
    pub title: String,
    /// Author / channel name
    pub author: String,
    /// Every encoding the service offers
    pub streams: Vec<StreamHandle>,
}

/// Pick the audio-only encoding with the highest reported bitrate
///
/// Encodings without a reported bitrate rank below any that have one.
pub fn select_audio_stream(streams: &[StreamHandle]) -> Option<&StreamHandle> {
    streams
        .iter()
        .filter(|s| s.is_audio_only())
        .max_by(|a, b| {
            a.abr_kbps
                .unwrap_or(-1.0)
                .total_cmp(&b.abr_kbps.unwrap_or(-1.0))
        })
}

/// Expands a collection reference into its member items
#[async_trait]
pub trait CollectionLister: Send + Sync {
    /// List the members of `reference` in the service's order
    ///
    /// # Errors
    ///
    /// Returns an error if the reference cannot be listed (private, removed,
    /// network failure, tool failure).
    async fn list_members(&self, reference: &str) -> crate::Result<Vec<ItemId>>;
}

/// Stream discovery and download for single items
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Look up an item's metadata and encodings
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is invalid or the lookup fails.
    async fn open(&self, item: &ItemId) -> crate::Result<MediaHandle>;

    /// Download `stream` to `dest`, returning the written path
    ///
    /// # Errors
    ///
    /// Returns an error on network or file-system failure. A partially written
    /// file is never left at `dest`.
    async fn download(&self, stream: &StreamHandle, dest: &Path) -> crate::Result<PathBuf>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
