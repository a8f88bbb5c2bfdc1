//! Per-run working directory
//!
//! Raw downloads land in `temp/`, converted files at the root. A freshly
//! created area is a scoped temporary directory: it lives exactly as long as
//! the [`WorkingArea`] value, so disposal is the holder's decision.

use crate::error::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Name of the subdirectory holding raw (pre-transcode) downloads
pub const TEMP_SUBDIR: &str = "temp";

/// Directory tree shared by all workers of one run
#[derive(Debug)]
pub struct WorkingArea {
    root: PathBuf,
    // Held only to tie the directory's lifetime to this value
    _guard: Option<TempDir>,
}

impl WorkingArea {
    /// Create a fresh, empty area under `parent` (or the system temp dir)
    ///
    /// The directory is removed when the returned value is dropped.
    pub fn create(parent: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("audio-dl-");
        let dir = match parent {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };
        let area = Self {
            root: dir.path().to_path_buf(),
            _guard: Some(dir),
        };
        std::fs::create_dir_all(area.temp_dir())?;
        tracing::debug!(root = ?area.root, "created working area");
        Ok(area)
    }

    /// Use an existing directory as the area; it is never removed by this crate
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let area = Self {
            root: root.into(),
            _guard: None,
        };
        std::fs::create_dir_all(area.temp_dir())?;
        Ok(area)
    }

    /// Root of the area (final files)
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Subtree for raw downloads
    pub fn temp_dir(&self) -> PathBuf {
        self.root.join(TEMP_SUBDIR)
    }

    /// Whether dropping this value removes the directory
    pub fn is_scoped(&self) -> bool {
        self._guard.is_some()
    }
}

/// Turn a display title into a single path component
///
/// Path separators and NUL would let a title escape the area or fail the
/// write, so they become `_`. Everything else is kept verbatim; an empty or
/// dot-only title becomes `untitled`.
pub fn file_stem_for_title(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    if stem.trim().is_empty() || stem.chars().all(|c| c == '.') {
        "untitled".to_string()
    } else {
        stem
    }
}
