// Downloader - per-video processing and the sequential batch loop
//
// A failing video becomes a FAILED line in the result log; it never stops
// the batch. Every line is flushed as soon as its video is done.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::errors::DownloadError;
use super::format_selector::FormatSelector;
use super::models::{DownloadOptions, DownloadOutcome, DownloadStatus};
use super::muxer::Muxer;
use super::probe::MetadataProbe;
use super::utils::clean_filename;
use super::video_id::extract_id;

/// Append-only result log, one flushed line per processed video
pub struct ResultLog<W: Write> {
    writer: W,
}

impl ResultLog<BufWriter<File>> {
    /// Create (truncate) the log file at `path`
    pub fn create(path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> ResultLog<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn append(&mut self, outcome: &DownloadOutcome) -> std::io::Result<()> {
        self.writer.write_all(outcome.to_log_line().as_bytes())?;
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// Stopped by Ctrl-C before the list was exhausted
    pub interrupted: bool,
}

pub struct Downloader {
    probe: MetadataProbe,
    muxer: Box<dyn Muxer>,
    options: DownloadOptions,
}

impl Downloader {
    pub fn new(probe: MetadataProbe, muxer: Box<dyn Muxer>, options: DownloadOptions) -> Self {
        Self {
            probe,
            muxer,
            options,
        }
    }

    /// Probe, select and mux one video
    pub async fn download_video(&self, video_url: &str) -> Result<PathBuf, DownloadError> {
        let (metadata, selection) = self
            .probe
            .resolve_best(video_url, self.options.max_quality)
            .await?;

        if self.options.debug {
            tracing::debug!("Available video formats:");
            for line in FormatSelector::describe_candidates(&metadata) {
                tracing::debug!("{}", line);
            }
        }

        tracing::info!("Processing video: {}", selection.title);
        tracing::info!(
            "Resolution: {}, Format: {}, Audio: {}",
            selection.resolution_label,
            selection.video_extension,
            selection.video_has_audio
        );
        if self.options.debug {
            let preview: String = selection.video_url.chars().take(100).collect();
            tracing::debug!("Video URL: {}...", preview);
        }

        let output = self.output_path(&selection.title, video_url, &FormatSelector::output_extension(&selection));

        tracing::info!("Downloading with {}...", self.muxer.name());
        self.muxer
            .mux(&selection.video_url, selection.audio_url.as_deref(), &output)
            .await?;

        if !output.exists() {
            return Err(DownloadError::MuxingFailure(format!(
                "{} was not written",
                output.display()
            )));
        }

        Ok(output)
    }

    fn output_path(&self, title: &str, video_url: &str, extension: &str) -> PathBuf {
        let mut name = clean_filename(title);
        if name.is_empty() {
            name = extract_id(video_url).unwrap_or_else(|| "video".to_string());
        }
        self.options.output_dir.join(format!("{}.{}", name, extension))
    }

    /// Process one video and turn any failure into a FAILED outcome
    pub async fn process_video(&self, video_url: &str) -> DownloadOutcome {
        match self.download_video(video_url).await {
            Ok(path) => {
                tracing::info!("File saved to: {}", path.display());
                DownloadOutcome::success(video_url, path)
            }
            Err(e) => {
                tracing::warn!("Error processing video {}: {}", video_url, e);
                match e.blocking_reason() {
                    Some(reason) if reason.is_permanent() => {
                        tracing::warn!("{}, skipping", reason.description())
                    }
                    Some(reason) => tracing::warn!("{}. {}", reason.description(), reason.hint()),
                    None => {}
                }
                DownloadOutcome::failed(video_url)
            }
        }
    }

    /// Process `urls` in order, appending one line per video to `log`
    pub async fn download_all<W: Write>(
        &self,
        urls: &[String],
        log: &mut ResultLog<W>,
    ) -> std::io::Result<BatchSummary> {
        let mut summary = BatchSummary::default();
        let total = urls.len();

        let interrupt = tokio::signal::ctrl_c();
        tokio::pin!(interrupt);

        for (index, video_url) in urls.iter().enumerate() {
            tracing::info!("Processing video {}/{}: {}", index + 1, total, video_url);

            let outcome = tokio::select! {
                outcome = self.process_video(video_url) => outcome,
                _ = &mut interrupt => {
                    tracing::warn!("Interrupted, {} left unprocessed", total - index);
                    summary.interrupted = true;
                    break;
                }
            };

            log.append(&outcome)?;
            match outcome.status {
                DownloadStatus::Success => summary.succeeded += 1,
                DownloadStatus::Failed => summary.failed += 1,
            }
        }

        Ok(summary)
    }
}
