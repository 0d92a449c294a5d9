// MetadataProbe - the one place that probes a single video with retries
//
// Both the batch downloader and the speed test go through `resolve_best`.

use super::errors::DownloadError;
use super::extractors::{ExtractorConfig, InfoExtractor};
use super::format_selector::FormatSelector;
use super::models::{SelectionResult, VideoMetadata};
use super::retry::RetryPolicy;
use super::video_id::{extract_id, watch_url};

pub struct MetadataProbe {
    extractor: Box<dyn InfoExtractor>,
    config: ExtractorConfig,
    retry: RetryPolicy,
}

impl MetadataProbe {
    pub fn new(extractor: Box<dyn InfoExtractor>, config: ExtractorConfig) -> Self {
        Self {
            extractor,
            config,
            retry: RetryPolicy::exponential(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Probe the canonical page of `video_url`, retrying transient failures
    /// with exponential backoff. The last failure is returned once attempts
    /// run out.
    pub async fn probe(&self, video_url: &str) -> Result<VideoMetadata, DownloadError> {
        let id = extract_id(video_url)
            .ok_or_else(|| DownloadError::IdentifierNotFound(video_url.to_string()))?;
        tracing::debug!("[Probe] Extracted video ID: {}", id);

        let page_url = watch_url(&id);
        let mut attempt = 0;

        loop {
            match self.extractor.extract(&page_url, &self.config).await {
                Ok(metadata) => return Ok(metadata),
                Err(e) if e.is_transient() && self.retry.has_next(attempt) => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        "Error occurred: {}. Retrying in {:.0}s... (Attempt {}/{})",
                        e,
                        delay.as_secs_f64(),
                        attempt + 1,
                        self.retry.max_retries
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::debug!("[Probe] Giving up on {} after {} attempt(s): {}", id, attempt + 1, e);
                    return Err(e);
                }
            }
        }
    }

    /// Probe and select the best stream pair
    pub async fn resolve_best(
        &self,
        video_url: &str,
        max_quality: Option<u32>,
    ) -> Result<(VideoMetadata, SelectionResult), DownloadError> {
        let metadata = self.probe(video_url).await?;
        let selection = FormatSelector::select_best(&metadata, max_quality)?;
        Ok((metadata, selection))
    }
}
