//! In-memory ZIP packaging of a working area

use crate::error::{Error, Result};
use crate::working_area::{TEMP_SUBDIR, WorkingArea};
use std::fs::File;
use std::io::{self, Cursor};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::FileOptions;

/// MIME type of the produced archive
pub const CONTENT_TYPE: &str = "application/zip";

/// Deflate level used for every entry
const COMPRESSION_LEVEL: i32 = 9;

/// A finished archive, held entirely in memory
#[must_use]
#[derive(Debug, Clone)]
pub struct Archive {
    /// Suggested file name for the download
    pub file_name: String,
    /// Entry names in the order they were written
    pub entries: Vec<String>,
    /// Paths that could not be read and were left out
    pub skipped: Vec<PathBuf>,
    /// The ZIP bytes
    pub bytes: Vec<u8>,
}

impl Archive {
    /// MIME type of [`Archive::bytes`]
    pub fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }
}

/// Archive every regular file under the area's root, keyed by relative path
///
/// Files are visited in directory-entry order. Nothing is excluded: raw files
/// left in `temp/` by a failed cleanup are packed too, with a warning. Files
/// that cannot be opened are logged and listed in [`Archive::skipped`]
/// instead of failing the whole archive.
pub async fn build(area: &WorkingArea, file_name: &str) -> Result<Archive> {
    let root = area.root().to_path_buf();
    let file_name = file_name.to_string();
    tokio::task::spawn_blocking(move || build_blocking(&root, file_name))
        .await
        .map_err(|e| Error::Other(format!("archive task failed: {}", e)))?
}

/// Entry name for `relative`: components joined with `/`
fn entry_name(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            _ => return None,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

fn build_blocking(root: &Path, file_name: String) -> Result<Archive> {
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL));

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let mut entries = Vec::new();
    let mut skipped = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                warn!(?path, error = %e, "skipping unreadable part of working area");
                skipped.push(path);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(name) = entry
            .path()
            .strip_prefix(root)
            .ok()
            .and_then(entry_name)
        else {
            warn!(path = ?entry.path(), "skipping entry with unusable path");
            skipped.push(entry.path().to_path_buf());
            continue;
        };

        let mut file = match File::open(entry.path()) {
            Ok(file) => file,
            Err(e) => {
                warn!(entry = %name, error = %e, "skipping unreadable file");
                skipped.push(entry.path().to_path_buf());
                continue;
            }
        };

        if name
            .strip_prefix(TEMP_SUBDIR)
            .is_some_and(|rest| rest.starts_with('/'))
        {
            warn!(entry = %name, "packing leftover intermediate file");
        }

        let size = file.metadata().map(|m| m.len()).unwrap_or(0);
        writer.start_file(
            name.as_str(),
            options.large_file(size > u64::from(u32::MAX)),
        )?;
        let bytes = io::copy(&mut file, &mut writer)?;
        debug!(entry = %name, bytes, "added archive entry");
        entries.push(name);
    }

    let bytes = writer.finish()?.into_inner();
    info!(
        entries = entries.len(),
        skipped = skipped.len(),
        bytes = bytes.len(),
        "archive built"
    );

    Ok(Archive {
        file_name,
        entries,
        skipped,
        bytes,
    })
}
