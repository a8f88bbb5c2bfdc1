//! Remote media lookup
//!
//! This module defines the collaborator traits for collection listing and
//! stream discovery/download, plus the production `yt-dlp` backed source.

mod traits;
mod ytdlp;

pub use traits::{CollectionLister, MediaHandle, MediaSource, StreamHandle, select_audio_stream};
pub use ytdlp::YtDlpSource;
