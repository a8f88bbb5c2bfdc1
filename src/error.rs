//! Error types for audio-dl
//!
//! This module provides the error handling for the library:
//! - [`Error`]: crate-level failures (configuration, I/O, external tools, archive)
//! - [`ItemError`]: per-item failures, folded into an [`Outcome`](crate::types::Outcome)
//!   at the worker boundary and never propagated
//! - [`ExpansionError`]: a collection reference that could not be listed

use crate::types::ItemId;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for audio-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for audio-dl
///
/// Returned by collaborators (media source, transcoder, tag writer) and by the
/// pipeline itself. Per-item processing converts these into [`ItemError`]s.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "concurrency")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// External tool execution failed (yt-dlp, ffmpeg)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Operation not supported (missing binary, not implemented, etc.)
    #[error("not supported: {0}")]
    NotSupported(String),

    /// ZIP archive could not be written
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// ID3 tag could not be read or written
    #[error("tag error: {0}")]
    Tag(#[from] id3::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Why a single item failed
///
/// The `Display` output is the human-readable reason shown after
/// `Failed to download {identifier}: `.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    /// The identifier is invalid or the remote lookup failed
    #[error("could not resolve {identifier}: {reason}")]
    Resolution {
        /// The identifier that could not be resolved
        identifier: ItemId,
        /// The reason the lookup failed
        reason: String,
    },

    /// The item exists but offers no audio-only stream
    #[error("no audio stream available for {identifier}")]
    NoStream {
        /// The identifier without an audio-only stream
        identifier: ItemId,
    },

    /// The selected stream could not be downloaded
    #[error("download failed: {reason}")]
    Download {
        /// The reason the download failed
        reason: String,
    },

    /// The downloaded file could not be converted
    #[error("transcoding failed: {reason}")]
    Transcode {
        /// The reason the conversion failed
        reason: String,
    },

    /// The converted file exists but its tags could not be written
    #[error("tag write failed for {path}: {reason}")]
    Tag {
        /// The converted file that is missing its tags
        path: PathBuf,
        /// The reason the tag write failed
        reason: String,
    },

    /// The worker slot itself failed (task panic or abort)
    #[error("worker failed: {reason}")]
    Infrastructure {
        /// Description of the slot-level failure
        reason: String,
    },

    /// The optional per-item deadline elapsed
    #[error("timed out after {limit:?}")]
    TimedOut {
        /// The configured deadline
        limit: Duration,
    },

    /// The batch was cancelled before this item finished
    #[error("cancelled")]
    Cancelled,
}

impl ItemError {
    /// Machine-readable error code for this failure kind
    pub fn code(&self) -> &'static str {
        match self {
            ItemError::Resolution { .. } => "resolution_error",
            ItemError::NoStream { .. } => "no_stream",
            ItemError::Download { .. } => "download_error",
            ItemError::Transcode { .. } => "transcode_error",
            ItemError::Tag { .. } => "tag_error",
            ItemError::Infrastructure { .. } => "infrastructure_error",
            ItemError::TimedOut { .. } => "timed_out",
            ItemError::Cancelled => "cancelled",
        }
    }
}

/// A collection reference that could not be expanded into items
///
/// Reported to an [`ErrorSink`](crate::types::ErrorSink); the reference simply
/// contributes no items to the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to process playlist {reference}: {reason}")]
pub struct ExpansionError {
    /// The raw collection reference
    pub reference: String,
    /// Why listing failed
    pub reason: String,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn all_item_errors() -> Vec<(ItemError, &'static str)> {
        vec![
            (
                ItemError::Resolution {
                    identifier: ItemId::from("abc"),
                    reason: "video unavailable".into(),
                },
                "resolution_error",
            ),
            (
                ItemError::NoStream {
                    identifier: ItemId::from("abc"),
                },
                "no_stream",
            ),
            (
                ItemError::Download {
                    reason: "connection reset".into(),
                },
                "download_error",
            ),
            (
                ItemError::Transcode {
                    reason: "invalid data".into(),
                },
                "transcode_error",
            ),
            (
                ItemError::Tag {
                    path: PathBuf::from("/tmp/a.mp3"),
                    reason: "read-only".into(),
                },
                "tag_error",
            ),
            (
                ItemError::Infrastructure {
                    reason: "task panicked".into(),
                },
                "infrastructure_error",
            ),
            (
                ItemError::TimedOut {
                    limit: Duration::from_secs(30),
                },
                "timed_out",
            ),
            (ItemError::Cancelled, "cancelled"),
        ]
    }

    #[test]
    fn test_item_error_codes_are_unique() {
        let variants = all_item_errors();
        let mut codes: Vec<&str> = variants.iter().map(|(_, code)| *code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), variants.len());

        for (error, expected) in variants {
            assert_eq!(error.code(), expected, "wrong code for {:?}", error);
        }
    }

    #[test]
    fn test_resolution_reason_mentions_identifier() {
        let error = ItemError::Resolution {
            identifier: ItemId::from("https://example.com/watch?v=XYZ"),
            reason: "HTTP 404".into(),
        };
        let msg = error.to_string();
        assert!(msg.contains("watch?v=XYZ"));
        assert!(msg.contains("HTTP 404"));
    }

    #[test]
    fn test_no_stream_message() {
        let error = ItemError::NoStream {
            identifier: ItemId::from("vid2"),
        };
        assert_eq!(error.to_string(), "no audio stream available for vid2");
    }

    #[test]
    fn test_timeout_message_keeps_sub_second_precision() {
        let error = ItemError::TimedOut {
            limit: Duration::from_millis(500),
        };
        assert_eq!(error.to_string(), "timed out after 500ms");

        let error = ItemError::TimedOut {
            limit: Duration::from_secs(90),
        };
        assert_eq!(error.to_string(), "timed out after 90s");
    }

    #[test]
    fn test_expansion_error_display() {
        let error = ExpansionError {
            reference: "https://example.com/playlist?list=BBB".into(),
            reason: "playlist is private".into(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to process playlist https://example.com/playlist?list=BBB: playlist is private"
        );
    }

    #[test]
    fn test_config_error_display() {
        let error = Error::Config {
            message: "concurrency must be at least 1".into(),
            key: Some("concurrency".into()),
        };
        assert_eq!(
            error.to_string(),
            "configuration error: concurrency must be at least 1"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error: Error = io.into();
        assert!(matches!(error, Error::Io(_)));
        assert!(error.to_string().contains("gone"));
    }
}
