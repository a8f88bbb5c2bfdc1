//! `yt-dlp` backed media source
//!
//! Metadata and collection listings come from the external `yt-dlp` binary's
//! JSON output; the selected stream is then fetched directly over HTTP.

use super::traits::{CollectionLister, MediaHandle, MediaSource, StreamHandle};
use crate::error::{Error, Result};
use crate::types::ItemId;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Media source driving the external `yt-dlp` binary
///
/// # Examples
///
/// ```no_run
/// use audio_dl::source::{MediaSource, YtDlpSource};
/// use audio_dl::ItemId;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = YtDlpSource::from_path().expect("yt-dlp not found in PATH");
/// let media = source.open(&ItemId::from("https://www.youtube.com/watch?v=dQw4w9WgXcQ")).await?;
/// println!("{} by {}", media.title, media.author);
/// # Ok(())
/// # }
/// ```
pub struct YtDlpSource {
    binary_path: PathBuf,
    client: reqwest::Client,
}

impl YtDlpSource {
    /// Create a new source with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            client: reqwest::Client::new(),
        }
    }

    /// Attempt to find yt-dlp in PATH
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Use a preconfigured HTTP client for stream downloads
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Run yt-dlp with `args` and return its stdout
    async fn run(&self, args: &[&str]) -> Result<Vec<u8>> {
        debug!(binary = ?self.binary_path, ?args, "running yt-dlp");

        let output = Command::new(&self.binary_path)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::ExternalTool(format!("Failed to execute yt-dlp: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("no error output")
                .trim()
                .to_string();
            return Err(Error::ExternalTool(format!(
                "yt-dlp exited with {}: {}",
                output.status, message
            )));
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl CollectionLister for YtDlpSource {
    async fn list_members(&self, reference: &str) -> Result<Vec<ItemId>> {
        let stdout = self
            .run(&[
                "--flat-playlist",
                "--dump-single-json",
                "--no-warnings",
                reference,
            ])
            .await?;
        parse_playlist(&stdout)
    }
}

#[async_trait]
impl MediaSource for YtDlpSource {
    async fn open(&self, item: &ItemId) -> Result<MediaHandle> {
        let stdout = self
            .run(&[
                "--dump-single-json",
                "--no-playlist",
                "--no-warnings",
                item.as_str(),
            ])
            .await?;
        parse_media_info(item, &stdout)
    }

    async fn download(&self, stream: &StreamHandle, dest: &Path) -> Result<PathBuf> {
        download_stream(&self.client, stream, dest).await
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}

#[derive(Debug, Deserialize)]
struct RawPlaylist {
    #[serde(default)]
    entries: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    id: Option<String>,
    url: Option<String>,
    webpage_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMediaInfo {
    title: Option<String>,
    uploader: Option<String>,
    channel: Option<String>,
    #[serde(default)]
    formats: Vec<RawFormat>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    format_id: String,
    url: Option<String>,
    ext: Option<String>,
    acodec: Option<String>,
    vcodec: Option<String>,
    abr: Option<f64>,
    #[serde(default)]
    http_headers: HashMap<String, String>,
}

fn codec_present(codec: Option<&str>) -> bool {
    matches!(codec, Some(c) if !c.is_empty() && c != "none")
}

/// Parse `--flat-playlist --dump-single-json` output into member identifiers
pub(crate) fn parse_playlist(json: &[u8]) -> Result<Vec<ItemId>> {
    let playlist: RawPlaylist = serde_json::from_slice(json)?;
    Ok(playlist
        .entries
        .into_iter()
        .filter_map(|entry| entry.url.or(entry.webpage_url).or(entry.id))
        .map(ItemId::from)
        .collect())
}

/// Parse `--dump-single-json` output for a single item
pub(crate) fn parse_media_info(item: &ItemId, json: &[u8]) -> Result<MediaHandle> {
    let info: RawMediaInfo = serde_json::from_slice(json)?;

    let title = info
        .title
        .ok_or_else(|| Error::Other(format!("no title reported for {}", item)))?;
    let author = info
        .uploader
        .or(info.channel)
        .unwrap_or_else(|| "Unknown".to_string());

    let streams = info
        .formats
        .into_iter()
        .filter_map(|f| {
            // Formats without a direct URL (e.g. storyboards) cannot be fetched
            let url = f.url?;
            Some(StreamHandle {
                format_id: f.format_id,
                url,
                ext: f.ext.unwrap_or_else(|| "mp4".to_string()),
                has_audio: codec_present(f.acodec.as_deref()),
                has_video: codec_present(f.vcodec.as_deref()),
                abr_kbps: f.abr,
                http_headers: f.http_headers,
            })
        })
        .collect();

    Ok(MediaHandle {
        identifier: item.clone(),
        title,
        author,
        streams,
    })
}

/// Fetch `stream` to `dest` through a `.part` file renamed on completion
pub(crate) async fn download_stream(
    client: &reqwest::Client,
    stream: &StreamHandle,
    dest: &Path,
) -> Result<PathBuf> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut request = client.get(&stream.url);
    for (name, value) in &stream.http_headers {
        request = request.header(name.as_str(), value.as_str());
    }
    let mut response = request.send().await?.error_for_status()?;

    let mut part_name = dest.as_os_str().to_owned();
    part_name.push(".part");
    let part_path = PathBuf::from(part_name);

    let mut file = tokio::fs::File::create(&part_path).await?;
    let mut written: u64 = 0;
    let copy_result: Result<()> = async {
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(())
    }
    .await;

    if let Err(e) = copy_result {
        drop(file);
        tokio::fs::remove_file(&part_path).await.ok();
        return Err(e);
    }
    drop(file);

    tokio::fs::rename(&part_path, dest).await?;
    debug!(?dest, bytes = written, format_id = %stream.format_id, "stream downloaded");
    Ok(dest.to_path_buf())
}
