//! Batch orchestration: resolve, schedule, archive
//!
//! [`Pipeline`] owns the collaborators and configuration for a batch. Each
//! call to [`Pipeline::run`] creates its own working area and worker pool and
//! joins every worker before packaging the results.

use crate::archive::{self, Archive};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::resolver;
use crate::scheduler;
use crate::source::{CollectionLister, MediaSource, YtDlpSource};
use crate::tagging::{Id3TagWriter, TagWriter};
use crate::transcode::{FfmpegTranscoder, Transcoder};
use crate::types::{ErrorSink, LogErrorSink, Outcome, ProgressSink};
use crate::worker::{Services, WorkerOptions};
use crate::working_area::WorkingArea;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Everything a finished batch produced
#[derive(Debug)]
pub struct PipelineOutput {
    /// One outcome per resolved item, in completion order
    pub outcomes: Vec<Outcome>,
    /// ZIP of every file in the working area, or why it could not be built
    ///
    /// The outcomes stay valid either way; the produced files are still in
    /// the working area.
    pub archive: Result<Archive>,
    /// The area the batch ran in; dropping the last handle of a freshly
    /// created area deletes it
    pub working_area: Arc<WorkingArea>,
}

impl PipelineOutput {
    /// User-facing result lines, one per outcome
    pub fn result_lines(&self) -> Vec<String> {
        self.outcomes.iter().map(ToString::to_string).collect()
    }

    /// Number of items that ended in success
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }
}

/// Batch downloader and converter
///
/// # Examples
///
/// ```no_run
/// use audio_dl::{Config, Pipeline};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pipeline = Pipeline::from_config(Config::default())?;
/// let inputs = ["https://www.youtube.com/watch?v=dQw4w9WgXcQ"];
/// let output = pipeline
///     .run(&inputs, &|done: usize, total: usize| println!("{}/{}", done, total))
///     .await?;
/// for line in output.result_lines() {
///     println!("{}", line);
/// }
/// let archive = output.archive?;
/// std::fs::write(&archive.file_name, &archive.bytes)?;
/// # Ok(())
/// # }
/// ```
pub struct Pipeline {
    config: Config,
    lister: Arc<dyn CollectionLister>,
    services: Services,
    errors: Arc<dyn ErrorSink>,
    cancel: CancellationToken,
}

impl Pipeline {
    /// Build a pipeline backed by `yt-dlp`, `ffmpeg` and ID3 tagging
    ///
    /// Binaries come from the explicit paths in `config.tools`, or from `PATH`
    /// when `search_path` is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid settings and
    /// [`Error::NotSupported`] when a required binary cannot be found.
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;

        let tools = &config.tools;
        let yt_dlp = tools
            .find_binary(tools.yt_dlp_path.as_deref(), "yt-dlp")
            .ok_or_else(|| Error::NotSupported("yt-dlp binary not found".to_string()))?;
        let ffmpeg = tools
            .find_binary(tools.ffmpeg_path.as_deref(), "ffmpeg")
            .ok_or_else(|| Error::NotSupported("ffmpeg binary not found".to_string()))?;

        tracing::info!(?yt_dlp, ?ffmpeg, "external tools located");

        let source = Arc::new(YtDlpSource::new(yt_dlp));
        let transcoder = FfmpegTranscoder::new(ffmpeg).with_bitrate(tools.audio_bitrate.clone());

        Self::builder(config)
            .lister(source.clone())
            .source(source)
            .transcoder(Arc::new(transcoder))
            .build()
    }

    /// Start a pipeline with custom collaborators
    pub fn builder(config: Config) -> PipelineBuilder {
        PipelineBuilder {
            config,
            lister: None,
            source: None,
            transcoder: None,
            tagger: None,
            errors: None,
        }
    }

    /// Configuration this pipeline runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Token that abandons in-flight and pending items
    ///
    /// Once fired it stays fired, so later runs fail every item as cancelled
    /// until [`Pipeline::reset_cancel`] is called.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Replace a fired cancellation token with a fresh one
    ///
    /// Tokens handed out earlier are detached and no longer affect this
    /// pipeline.
    pub fn reset_cancel(&mut self) {
        if self.cancel.is_cancelled() {
            tracing::debug!("resetting cancellation token");
        }
        self.cancel = CancellationToken::new();
    }

    /// Process a batch in a freshly created working area
    ///
    /// The area lives under `working_dir_parent` (or the system temp dir) and
    /// is deleted when the returned [`PipelineOutput::working_area`] is dropped.
    ///
    /// # Errors
    ///
    /// Only fails when the working area cannot be created. Per-item failures
    /// are reported in the outcomes and an archive failure in
    /// [`PipelineOutput::archive`].
    pub async fn run<S: AsRef<str>>(
        &self,
        raw_inputs: &[S],
        progress: &dyn ProgressSink,
    ) -> Result<PipelineOutput> {
        let area = WorkingArea::create(self.config.pipeline.working_dir_parent.as_deref())?;
        Ok(self.run_in(Arc::new(area), raw_inputs, progress).await)
    }

    /// Process a batch in a caller-provided working area
    ///
    /// Raw downloads already present in the area's `temp/` are reused. Once
    /// the area exists nothing aborts the batch, so this always produces an
    /// output.
    pub async fn run_in<S: AsRef<str>>(
        &self,
        area: Arc<WorkingArea>,
        raw_inputs: &[S],
        progress: &dyn ProgressSink,
    ) -> PipelineOutput {
        let pipeline = &self.config.pipeline;

        let items = resolver::resolve(
            raw_inputs,
            self.lister.as_ref(),
            self.errors.as_ref(),
            &pipeline.collection_marker,
        )
        .await;

        let options = WorkerOptions {
            item_timeout: pipeline.item_timeout,
            cancel: self.cancel.clone(),
        };
        let outcomes = scheduler::run(
            items,
            Arc::clone(&area),
            self.services.clone(),
            options,
            pipeline.concurrency,
            progress,
        )
        .await;

        let archive = archive::build(&area, &pipeline.archive_name).await;
        if let Err(e) = &archive {
            tracing::error!(error = %e, "failed to build archive");
        }

        PipelineOutput {
            outcomes,
            archive,
            working_area: area,
        }
    }
}

/// Builder for [`Pipeline`] with injectable collaborators
///
/// The media source, collection lister and transcoder are required. Tagging
/// defaults to [`Id3TagWriter`] and expansion errors default to
/// [`LogErrorSink`].
pub struct PipelineBuilder {
    config: Config,
    lister: Option<Arc<dyn CollectionLister>>,
    source: Option<Arc<dyn MediaSource>>,
    transcoder: Option<Arc<dyn Transcoder>>,
    tagger: Option<Arc<dyn TagWriter>>,
    errors: Option<Arc<dyn ErrorSink>>,
}

impl PipelineBuilder {
    /// Set the collection lister
    pub fn lister(mut self, lister: Arc<dyn CollectionLister>) -> Self {
        self.lister = Some(lister);
        self
    }

    /// Set the media source
    pub fn source(mut self, source: Arc<dyn MediaSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the transcoder
    pub fn transcoder(mut self, transcoder: Arc<dyn Transcoder>) -> Self {
        self.transcoder = Some(transcoder);
        self
    }

    /// Set the tag writer
    pub fn tagger(mut self, tagger: Arc<dyn TagWriter>) -> Self {
        self.tagger = Some(tagger);
        self
    }

    /// Set the sink for collection references that fail to expand
    pub fn error_sink(mut self, errors: Arc<dyn ErrorSink>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Validate the configuration and assemble the pipeline
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid settings and
    /// [`Error::NotSupported`] when a required collaborator is missing.
    pub fn build(self) -> Result<Pipeline> {
        self.config.validate()?;

        let missing = |what: &str| Error::NotSupported(format!("pipeline has no {}", what));
        let lister = self.lister.ok_or_else(|| missing("collection lister"))?;
        let source = self.source.ok_or_else(|| missing("media source"))?;
        let transcoder = self.transcoder.ok_or_else(|| missing("transcoder"))?;

        tracing::debug!(
            source = source.name(),
            transcoder = transcoder.name(),
            concurrency = self.config.pipeline.concurrency,
            "pipeline assembled"
        );

        Ok(Pipeline {
            config: self.config,
            lister,
            services: Services {
                source,
                transcoder,
                tagger: self.tagger.unwrap_or_else(|| Arc::new(Id3TagWriter)),
            },
            errors: self.errors.unwrap_or_else(|| Arc::new(LogErrorSink)),
            cancel: CancellationToken::new(),
        })
    }
}
