//! Fetch-transcode worker: one item in, one [`Outcome`] out

use crate::error::ItemError;
use crate::source::{MediaSource, select_audio_stream};
use crate::tagging::TagWriter;
use crate::transcode::Transcoder;
use crate::types::{ItemId, Outcome};
use crate::working_area::{WorkingArea, file_stem_for_title};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Collaborators a worker needs to process an item
#[derive(Clone)]
pub struct Services {
    /// Stream discovery and download
    pub source: Arc<dyn MediaSource>,
    /// Conversion to the target format
    pub transcoder: Arc<dyn Transcoder>,
    /// Tag persistence
    pub tagger: Arc<dyn TagWriter>,
}

/// Per-item limits; the default imposes none
#[derive(Clone, Debug, Default)]
pub struct WorkerOptions {
    /// Deadline for the whole item (None = wait forever)
    pub item_timeout: Option<Duration>,
    /// Fired to abandon items still in flight
    pub cancel: CancellationToken,
}

/// A converted file that still needs cleanup and tags
struct Converted {
    title: String,
    author: String,
    bitrate: String,
    raw_path: PathBuf,
    final_path: PathBuf,
}

/// Process one item to completion
///
/// Every failure is folded into [`Outcome::Failure`]; this never panics on
/// collaborator errors and never returns early without an outcome.
///
/// The deadline and cancellation cover lookup, download and transcode. Once
/// the converted file exists, cleanup and tagging run to completion, so no
/// tag write is still in progress after the outcome is returned.
pub async fn process(
    item: ItemId,
    area: Arc<WorkingArea>,
    services: Services,
    options: WorkerOptions,
) -> Outcome {
    let work = fetch_and_transcode(&item, &area, &services);

    let bounded = async {
        match options.item_timeout {
            Some(limit) => tokio::time::timeout(limit, work)
                .await
                .unwrap_or(Err(ItemError::TimedOut { limit })),
            None => work.await,
        }
    };

    let converted = tokio::select! {
        biased;
        _ = options.cancel.cancelled() => Err(ItemError::Cancelled),
        result = bounded => result,
    };

    let result = match converted {
        Ok(converted) => finish(&item, &services, converted).await,
        Err(error) => Err(error),
    };

    match result {
        Ok(outcome) => {
            info!(item = %item, "item complete");
            outcome
        }
        Err(error) => {
            warn!(item = %item, code = error.code(), error = %error, "item failed");
            Outcome::failure(item, error)
        }
    }
}

async fn fetch_and_transcode(
    item: &ItemId,
    area: &WorkingArea,
    services: &Services,
) -> std::result::Result<Converted, ItemError> {
    let media = services
        .source
        .open(item)
        .await
        .map_err(|e| ItemError::Resolution {
            identifier: item.clone(),
            reason: e.to_string(),
        })?;

    let stream = select_audio_stream(&media.streams).ok_or_else(|| ItemError::NoStream {
        identifier: item.clone(),
    })?;
    debug!(
        item = %item,
        format_id = %stream.format_id,
        abr = ?stream.abr_kbps,
        "selected audio stream"
    );

    let stem = file_stem_for_title(&media.title);
    let raw_path = area.temp_dir().join(format!("{}.{}", stem, stream.ext));

    if tokio::fs::try_exists(&raw_path).await.unwrap_or(false) {
        debug!(item = %item, ?raw_path, "raw file already present, skipping download");
    } else {
        services
            .source
            .download(stream, &raw_path)
            .await
            .map_err(|e| ItemError::Download {
                reason: e.to_string(),
            })?;
    }

    let final_path = area
        .root()
        .join(format!("{}.{}", stem, services.transcoder.extension()));
    services
        .transcoder
        .transcode(&raw_path, &final_path)
        .await
        .map_err(|e| ItemError::Transcode {
            reason: e.to_string(),
        })?;

    let bitrate = stream.bitrate_label();
    Ok(Converted {
        title: media.title,
        author: media.author,
        bitrate,
        raw_path,
        final_path,
    })
}

async fn finish(
    item: &ItemId,
    services: &Services,
    converted: Converted,
) -> std::result::Result<Outcome, ItemError> {
    let Converted {
        title,
        author,
        bitrate,
        raw_path,
        final_path,
    } = converted;

    // The converted file already exists, so a leftover raw file only costs space
    if let Err(e) = tokio::fs::remove_file(&raw_path).await {
        warn!(item = %item, ?raw_path, error = %e, "failed to remove raw download");
    }

    services
        .tagger
        .write_tags(&final_path, &title, &author)
        .await
        .map_err(|e| ItemError::Tag {
            path: final_path.clone(),
            reason: e.to_string(),
        })?;

    Ok(Outcome::Success {
        identifier: item.clone(),
        title,
        author,
        bitrate,
        path: final_path,
    })
}
