//! Configuration types for audio-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Batch behavior configuration (concurrency, collection detection, working area)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum number of items processed at once (default: 5)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Substring that marks a raw input as a collection reference (default: "playlist")
    #[serde(default = "default_collection_marker")]
    pub collection_marker: String,

    /// Directory under which each run's working area is created
    /// (default: the system temp directory)
    #[serde(default)]
    pub working_dir_parent: Option<PathBuf>,

    /// Deadline for a single item (None = no deadline)
    ///
    /// A stuck fetch or transcode otherwise holds its slot indefinitely.
    #[serde(default, with = "optional_duration_serde")]
    pub item_timeout: Option<Duration>,

    /// File name offered for the produced archive (default: "youtube_mp3s.zip")
    #[serde(default = "default_archive_name")]
    pub archive_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            collection_marker: default_collection_marker(),
            working_dir_parent: None,
            item_timeout: None,
            archive_name: default_archive_name(),
        }
    }
}

/// External tool paths (yt-dlp, ffmpeg) and encoder settings
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub yt_dlp_path: Option<PathBuf>,

    /// Path to ffmpeg executable (auto-detected if None)
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Whether to search PATH for external binaries if explicit paths not set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// MP3 bitrate passed to the encoder, e.g. "192k" (None = encoder default)
    #[serde(default)]
    pub audio_bitrate: Option<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            yt_dlp_path: None,
            ffmpeg_path: None,
            search_path: true,
            audio_bitrate: None,
        }
    }
}

impl ToolsConfig {
    /// Resolve a tool binary: explicit path first, then PATH if allowed
    pub fn find_binary(&self, explicit: Option<&Path>, name: &str) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if self.search_path {
            which::which(name).ok()
        } else {
            None
        }
    }
}

/// Main configuration for [`Pipeline`](crate::Pipeline)
///
/// Sub-config fields are flattened, so the serialized form has no nesting.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Batch behavior settings
    #[serde(flatten)]
    pub pipeline: PipelineConfig,

    /// External tool settings
    #[serde(flatten)]
    pub tools: ToolsConfig,
}

impl Config {
    /// Load a configuration from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that would make a run impossible
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.concurrency == 0 {
            return Err(Error::Config {
                message: "concurrency must be at least 1".to_string(),
                key: Some("concurrency".to_string()),
            });
        }
        if self.pipeline.collection_marker.trim().is_empty() {
            return Err(Error::Config {
                message: "collection_marker must not be empty".to_string(),
                key: Some("collection_marker".to_string()),
            });
        }
        if self.pipeline.archive_name.trim().is_empty() {
            return Err(Error::Config {
                message: "archive_name must not be empty".to_string(),
                key: Some("archive_name".to_string()),
            });
        }
        Ok(())
    }
}

fn default_concurrency() -> usize {
    5
}

fn default_collection_marker() -> String {
    "playlist".to_string()
}

fn default_archive_name() -> String {
    "youtube_mp3s.zip".to_string()
}

fn default_true() -> bool {
    true
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
