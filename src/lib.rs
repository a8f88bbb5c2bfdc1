//! # audio-dl
//!
//! Batch audio fetching, MP3 conversion and ZIP packaging.
//!
//! ## Design Philosophy
//!
//! audio-dl is designed to be:
//! - **Library-first** - No CLI or UI; callers supply inputs and render results
//! - **Failure-tolerant** - One bad item never aborts the batch
//! - **Pluggable** - Stream lookup, transcoding and tagging sit behind traits
//!
//! A batch of raw inputs (single items and collection references) is expanded
//! into items, each item is fetched, transcoded and tagged by a bounded pool of
//! workers, and every produced file is packed into an in-memory ZIP.
//!
//! ## Quick Start
//!
//! ```no_run
//! use audio_dl::{Config, Pipeline, parse_inputs};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = Pipeline::from_config(Config::default())?;
//!
//!     let inputs = parse_inputs(
//!         "https://www.youtube.com/watch?v=AAA https://www.youtube.com/playlist?list=BBB",
//!     );
//!     let progress = |done: usize, total: usize| println!("{}/{}", done, total);
//!     let output = pipeline.run(&inputs, &progress).await?;
//!
//!     for line in output.result_lines() {
//!         println!("{}", line);
//!     }
//!     let archive = output.archive?;
//!     std::fs::write(&archive.file_name, &archive.bytes)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// In-memory ZIP packaging
pub mod archive;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Batch orchestration
pub mod pipeline;
/// Expansion of raw inputs into items
pub mod resolver;
/// Bounded concurrent execution of workers
pub mod scheduler;
/// Remote media lookup and download
pub mod source;
/// Descriptive tag writing
pub mod tagging;
/// Local audio transcoding
pub mod transcode;
/// Core types and callbacks
pub mod types;
/// Per-item fetch, transcode and tag
pub mod worker;
/// Per-run working directory
pub mod working_area;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use archive::Archive;
pub use config::{Config, PipelineConfig, ToolsConfig};
pub use error::{Error, ExpansionError, ItemError, Result};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineOutput};
pub use resolver::parse_inputs;
pub use source::{CollectionLister, MediaHandle, MediaSource, StreamHandle, YtDlpSource};
pub use tagging::{Id3TagWriter, TagWriter};
pub use transcode::{FfmpegTranscoder, Transcoder};
pub use types::{ErrorSink, ItemId, LogErrorSink, NoProgress, Outcome, ProgressSink};
pub use working_area::WorkingArea;
