//! In-memory collaborators standing in for yt-dlp and ffmpeg

use async_trait::async_trait;
use audio_dl::{
    CollectionLister, Error, ItemId, MediaHandle, MediaSource, Result, StreamHandle, Transcoder,
};
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Catalog of known items and collections
#[derive(Default)]
pub struct FakeCatalog {
    items: HashMap<String, (String, String, Vec<StreamHandle>)>,
    collections: HashMap<String, Vec<String>>,
    downloads: AtomicUsize,
}

pub fn stream(format_id: &str, ext: &str, audio: bool, video: bool, abr: Option<f64>) -> StreamHandle {
    StreamHandle {
        format_id: format_id.to_string(),
        url: format!("memory://{}", format_id),
        ext: ext.to_string(),
        has_audio: audio,
        has_video: video,
        abr_kbps: abr,
        http_headers: HashMap::new(),
    }
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Item with a muxed stream and an audio-only webm stream at `abr` kbps
    pub fn song(mut self, id: &str, title: &str, author: &str, abr: f64) -> Self {
        let streams = vec![
            stream("18", "mp4", true, true, Some(96.0)),
            stream("251", "webm", true, false, Some(abr)),
        ];
        self.items
            .insert(id.to_string(), (title.to_string(), author.to_string(), streams));
        self
    }

    /// Item offering no audio-only stream
    pub fn video(mut self, id: &str, title: &str, author: &str) -> Self {
        let streams = vec![stream("137", "mp4", false, true, None)];
        self.items
            .insert(id.to_string(), (title.to_string(), author.to_string(), streams));
        self
    }

    pub fn playlist(mut self, reference: &str, members: &[&str]) -> Self {
        self.collections.insert(
            reference.to_string(),
            members.iter().map(|m| m.to_string()).collect(),
        );
        self
    }

    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CollectionLister for FakeCatalog {
    async fn list_members(&self, reference: &str) -> Result<Vec<ItemId>> {
        self.collections
            .get(reference)
            .map(|members| members.iter().map(|m| ItemId::from(m.as_str())).collect())
            .ok_or_else(|| Error::ExternalTool(format!("ERROR: {} is unavailable", reference)))
    }
}

#[async_trait]
impl MediaSource for FakeCatalog {
    async fn open(&self, item: &ItemId) -> Result<MediaHandle> {
        let (title, author, streams) = self
            .items
            .get(item.as_str())
            .ok_or_else(|| Error::ExternalTool(format!("ERROR: {} is unavailable", item)))?;
        Ok(MediaHandle {
            identifier: item.clone(),
            title: title.clone(),
            author: author.clone(),
            streams: streams.clone(),
        })
    }

    async fn download(&self, stream: &StreamHandle, dest: &Path) -> Result<PathBuf> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        tokio::fs::write(dest, format!("encoded audio from format {}", stream.format_id)).await?;
        Ok(dest.to_path_buf())
    }

    fn name(&self) -> &'static str {
        "catalog"
    }
}

/// Transcoder that copies bytes unchanged
pub struct PassthroughTranscoder;

#[async_trait]
impl Transcoder for PassthroughTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<()> {
        tokio::fs::copy(input, output).await?;
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "mp3"
    }

    fn name(&self) -> &'static str {
        "passthrough"
    }
}

/// Entry name to contents of every file in a ZIP
pub fn unzip(bytes: &[u8]) -> HashMap<String, Vec<u8>> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.to_vec()))
        .unwrap_or_else(|e| panic!("invalid archive: {}", e));
    let mut files = HashMap::new();
    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .unwrap_or_else(|e| panic!("unreadable entry {}: {}", i, e));
        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .unwrap_or_else(|e| panic!("unreadable entry {}: {}", i, e));
        files.insert(file.name().to_string(), data);
    }
    files
}
