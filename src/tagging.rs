//! Descriptive tag writing

use crate::error::{Error, Result};
use async_trait::async_trait;
use id3::{ErrorKind, Tag, TagLike, Version};
use std::path::{Path, PathBuf};

/// Persists title and author fields into an audio file
#[async_trait]
pub trait TagWriter: Send + Sync {
    /// Write `title` and `author` into the file at `path`
    ///
    /// When the file has no tag container yet, one is created first.
    async fn write_tags(&self, path: &Path, title: &str, author: &str) -> Result<()>;
}

/// ID3v2.4 tag writer backed by the `id3` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct Id3TagWriter;

impl Id3TagWriter {
    fn write_blocking(path: &Path, title: &str, author: &str) -> Result<()> {
        let mut tag = match Tag::read_from_path(path) {
            Ok(tag) => tag,
            Err(e) if matches!(e.kind, ErrorKind::NoTag) => Tag::new(),
            Err(e) => return Err(Error::Tag(e)),
        };
        tag.set_title(title);
        tag.set_artist(author);
        tag.write_to_path(path, Version::Id3v24)?;
        Ok(())
    }
}

#[async_trait]
impl TagWriter for Id3TagWriter {
    async fn write_tags(&self, path: &Path, title: &str, author: &str) -> Result<()> {
        let path: PathBuf = path.to_path_buf();
        let title = title.to_string();
        let author = author.to_string();

        tokio::task::spawn_blocking(move || Self::write_blocking(&path, &title, &author))
            .await
            .map_err(|e| Error::Other(format!("tag writer task failed: {}", e)))?
    }
}
