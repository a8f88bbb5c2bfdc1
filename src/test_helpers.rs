//! Shared in-process fakes for unit tests.

use crate::error::{Error, Result};
use crate::source::{CollectionLister, MediaHandle, MediaSource, StreamHandle};
use crate::tagging::{Id3TagWriter, TagWriter};
use crate::transcode::Transcoder;
use crate::types::ItemId;
use crate::worker::Services;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// What the fake source knows about one item
#[derive(Clone, Debug)]
pub(crate) struct FakeMedia {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) streams: Vec<StreamHandle>,
    pub(crate) delay: Duration,
    pub(crate) panic_on_open: bool,
}

fn stream(format_id: &str, ext: &str, audio: bool, video: bool, abr: Option<f64>) -> StreamHandle {
    StreamHandle {
        format_id: format_id.to_string(),
        url: format!("fake://{}", format_id),
        ext: ext.to_string(),
        has_audio: audio,
        has_video: video,
        abr_kbps: abr,
        http_headers: HashMap::new(),
    }
}

impl FakeMedia {
    /// Item with a muxed stream and one audio-only m4a stream at `abr` kbps
    pub(crate) fn audio(title: &str, author: &str, abr: f64) -> Self {
        Self {
            title: title.to_string(),
            author: author.to_string(),
            streams: vec![
                stream("18", "mp4", true, true, Some(96.0)),
                stream("140", "m4a", true, false, Some(abr)),
            ],
            delay: Duration::ZERO,
            panic_on_open: false,
        }
    }

    /// Item that only offers muxed or video streams
    pub(crate) fn video_only(title: &str, author: &str) -> Self {
        Self {
            streams: vec![
                stream("18", "mp4", true, true, Some(96.0)),
                stream("137", "mp4", false, true, None),
            ],
            ..Self::audio(title, author, 0.0)
        }
    }

    /// Delay the lookup of this item
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Make the lookup of this item panic
    pub(crate) fn panicking(mut self) -> Self {
        self.panic_on_open = true;
        self
    }
}

/// In-memory media source and collection lister
#[derive(Default)]
pub(crate) struct FakeSource {
    items: HashMap<String, FakeMedia>,
    collections: HashMap<String, Vec<ItemId>>,
    open_delay: Duration,
    downloads: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_item(mut self, id: &str, media: FakeMedia) -> Self {
        self.items.insert(id.to_string(), media);
        self
    }

    pub(crate) fn with_collection(mut self, reference: &str, members: &[&str]) -> Self {
        self.collections.insert(
            reference.to_string(),
            members.iter().map(|m| ItemId::from(*m)).collect(),
        );
        self
    }

    /// Delay every lookup
    pub(crate) fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = delay;
        self
    }

    pub(crate) fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    /// Lookups currently running
    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of lookups observed running at once
    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CollectionLister for FakeSource {
    async fn list_members(&self, reference: &str) -> Result<Vec<ItemId>> {
        self.collections
            .get(reference)
            .cloned()
            .ok_or_else(|| Error::ExternalTool(format!("playlist {} does not exist", reference)))
    }
}

#[async_trait]
impl MediaSource for FakeSource {
    async fn open(&self, item: &ItemId) -> Result<MediaHandle> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let media = self
            .items
            .get(item.as_str())
            .ok_or_else(|| Error::ExternalTool(format!("video {} is unavailable", item)))?;

        tokio::time::sleep(self.open_delay + media.delay).await;
        if media.panic_on_open {
            panic!("fake source exploded on {}", item);
        }

        Ok(MediaHandle {
            identifier: item.clone(),
            title: media.title.clone(),
            author: media.author.clone(),
            streams: media.streams.clone(),
        })
    }

    async fn download(&self, stream: &StreamHandle, dest: &Path) -> Result<PathBuf> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, format!("raw {} bytes", stream.format_id)).await?;
        Ok(dest.to_path_buf())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Transcoder that copies the input verbatim
pub(crate) struct CopyTranscoder;

#[async_trait]
impl Transcoder for CopyTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<()> {
        tokio::fs::copy(input, output).await?;
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "mp3"
    }

    fn name(&self) -> &'static str {
        "copy"
    }
}

/// Transcoder that rejects every input
pub(crate) struct FailingTranscoder;

#[async_trait]
impl Transcoder for FailingTranscoder {
    async fn transcode(&self, input: &Path, _output: &Path) -> Result<()> {
        Err(Error::ExternalTool(format!(
            "ffmpeg exited with exit status: 1: {}: Invalid data found when processing input",
            input.display()
        )))
    }

    fn extension(&self) -> &'static str {
        "mp3"
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Tag writer that always fails
pub(crate) struct FailingTagWriter;

#[async_trait]
impl TagWriter for FailingTagWriter {
    async fn write_tags(&self, _path: &Path, _title: &str, _author: &str) -> Result<()> {
        Err(Error::Other("read-only file system".to_string()))
    }
}

/// ID3 tag writer that waits before writing and counts finished writes
pub(crate) struct SlowTagWriter {
    delay: Duration,
    completed: AtomicUsize,
}

impl SlowTagWriter {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            completed: AtomicUsize::new(0),
        }
    }

    pub(crate) fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TagWriter for SlowTagWriter {
    async fn write_tags(&self, path: &Path, title: &str, author: &str) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        Id3TagWriter.write_tags(path, title, author).await?;
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Services around `source` with a copying transcoder and the real ID3 writer
pub(crate) fn test_services(source: FakeSource) -> (Services, Arc<FakeSource>) {
    let source = Arc::new(source);
    let services = Services {
        source: source.clone(),
        transcoder: Arc::new(CopyTranscoder),
        tagger: Arc::new(Id3TagWriter),
    };
    (services, source)
}
