//! Core types for audio-dl

use crate::error::{ExpansionError, ItemError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Opaque identifier locating a single fetchable item (usually a URL)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create a new ItemId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for ItemId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of processing one item
///
/// Exactly one `Outcome` is produced per scheduled item. The `Display`
/// implementation renders the user-facing result line.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Audio was fetched, converted and tagged
    Success {
        /// Identifier that was processed
        identifier: ItemId,
        /// Display title reported by the remote service
        title: String,
        /// Author reported by the remote service
        author: String,
        /// Bitrate reported by the selected stream (e.g. "160kbps")
        bitrate: String,
        /// Final audio file inside the working area
        path: PathBuf,
    },
    /// Processing stopped at some step
    Failure {
        /// Identifier that was processed
        identifier: ItemId,
        /// What went wrong
        error: ItemError,
    },
}

impl Outcome {
    /// Build a failure outcome
    pub fn failure(identifier: ItemId, error: ItemError) -> Self {
        Outcome::Failure { identifier, error }
    }

    /// Whether this outcome is a success
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// Identifier this outcome belongs to
    pub fn identifier(&self) -> &ItemId {
        match self {
            Outcome::Success { identifier, .. } | Outcome::Failure { identifier, .. } => {
                identifier
            }
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Success {
                title,
                author,
                bitrate,
                ..
            } => write!(
                f,
                "Downloaded and converted: {} by {}, Bitrate: {}",
                title, author, bitrate
            ),
            Outcome::Failure { identifier, error } => {
                write!(f, "Failed to download {}: {}", identifier, error)
            }
        }
    }
}

/// Receives aggregate progress as items complete
///
/// Called synchronously by the scheduler, once per completed item, with
/// `completed` running from 1 to `total`.
pub trait ProgressSink: Send + Sync {
    /// One more item finished
    fn on_progress(&self, completed: usize, total: usize);
}

impl<F> ProgressSink for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn on_progress(&self, completed: usize, total: usize) {
        self(completed, total)
    }
}

/// Progress sink that ignores all updates
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _completed: usize, _total: usize) {}
}

/// Receives collection references that could not be expanded
pub trait ErrorSink: Send + Sync {
    /// Report one failed expansion
    fn report(&self, error: &ExpansionError);
}

impl<F> ErrorSink for F
where
    F: Fn(&ExpansionError) + Send + Sync,
{
    fn report(&self, error: &ExpansionError) {
        self(error)
    }
}

/// Error sink that logs expansion failures through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogErrorSink;

impl ErrorSink for LogErrorSink {
    fn report(&self, error: &ExpansionError) {
        tracing::error!(
            reference = %error.reference,
            reason = %error.reason,
            "failed to expand collection reference"
        );
    }
}
