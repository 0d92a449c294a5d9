// UrlExpander - flattens input URLs into single-video URLs
//
// Failures here never abort the batch: rate limits are waited out a few
// times, anything else is logged and the URL contributes nothing.

use std::future::Future;
use std::pin::Pin;

use super::extractors::{ExtractorConfig, InfoExtractor};
use super::retry::RetryPolicy;

/// Marker of a YouTube watch page in a canonical URL
const VIDEO_DOMAIN_MARKER: &str = "youtube.com";

/// Nested collections (channel -> tab -> videos) are followed this deep
const MAX_NESTING: usize = 3;

/// Shape of a flat probe result
#[derive(Debug, Clone, PartialEq)]
pub enum UrlShape {
    /// Playlist or channel; members in listing order
    Collection(Vec<Entry>),
    /// One playable video
    Single(String),
    /// Anything else; carries the reported `_type`
    Unsupported(Option<String>),
}

/// One member of a collection listing
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Video(String),
    /// A member that is itself a collection (e.g. a channel tab)
    Nested(String),
    /// No resolvable reference
    Missing,
}

/// Classify a flat probe payload
pub fn classify(info: &serde_json::Value) -> UrlShape {
    let kind = info.get("_type").and_then(|v| v.as_str());
    let webpage_url = non_empty_str(info, "webpage_url");
    let url = non_empty_str(info, "url");

    if kind == Some("playlist") {
        let entries = info
            .get("entries")
            .and_then(|v| v.as_array())
            .map(|entries| entries.iter().map(classify_entry).collect())
            .unwrap_or_default();
        return UrlShape::Collection(entries);
    }

    if kind == Some("url") || webpage_url.map_or(false, |u| u.contains(VIDEO_DOMAIN_MARKER)) {
        // prefer the resolved page over the generic url field
        if let Some(reference) = webpage_url.or(url) {
            return UrlShape::Single(reference.to_string());
        }
    }

    UrlShape::Unsupported(kind.map(str::to_string))
}

fn non_empty_str<'a>(info: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    info.get(key).and_then(|v| v.as_str()).filter(|s| !s.is_empty())
}

fn classify_entry(entry: &serde_json::Value) -> Entry {
    let Some(url) = non_empty_str(entry, "url") else {
        return Entry::Missing;
    };

    let kind = entry.get("_type").and_then(|v| v.as_str());
    let ie_key = entry.get("ie_key").and_then(|v| v.as_str());

    if kind == Some("playlist") || ie_key == Some("YoutubeTab") {
        Entry::Nested(url.to_string())
    } else {
        Entry::Video(url.to_string())
    }
}

pub struct UrlExpander {
    extractor: Box<dyn InfoExtractor>,
    config: ExtractorConfig,
    retry: RetryPolicy,
}

impl UrlExpander {
    pub fn new(extractor: Box<dyn InfoExtractor>, config: ExtractorConfig) -> Self {
        Self {
            extractor,
            config,
            retry: RetryPolicy::rate_limited(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Single-video URLs behind `url`; empty when it cannot be resolved
    pub async fn expand(&self, url: &str) -> Vec<String> {
        self.expand_nested(url, 0).await
    }

    fn expand_nested<'a>(
        &'a self,
        url: &'a str,
        depth: usize,
    ) -> Pin<Box<dyn Future<Output = Vec<String>> + Send + 'a>> {
        Box::pin(async move {
            let Some(info) = self.probe_flat(url).await else {
                return Vec::new();
            };

            match classify(&info) {
                UrlShape::Collection(entries) => {
                    let mut urls = Vec::new();
                    for entry in entries {
                        match entry {
                            Entry::Video(video) => urls.push(video),
                            Entry::Nested(nested) if depth + 1 < MAX_NESTING => {
                                tracing::debug!("[Expander] Following nested collection {}", nested);
                                urls.extend(self.expand_nested(&nested, depth + 1).await);
                            }
                            Entry::Nested(nested) => {
                                tracing::warn!("Skipping {}: collections nested too deep", nested)
                            }
                            Entry::Missing => {}
                        }
                    }
                    urls
                }
                UrlShape::Single(video) => vec![video],
                UrlShape::Unsupported(kind) => {
                    tracing::warn!(
                        "Unsupported URL type: {} ({})",
                        kind.as_deref().unwrap_or("unknown"),
                        url
                    );
                    Vec::new()
                }
            }
        })
    }

    /// Flat probe; only rate limits are retried, with fixed delay + jitter
    async fn probe_flat(&self, url: &str) -> Option<serde_json::Value> {
        let mut attempt = 0;

        loop {
            match self.extractor.extract_flat(url, &self.config).await {
                Ok(info) => return Some(info),
                Err(e) if e.is_rate_limited() => {
                    if !self.retry.has_next(attempt) {
                        tracing::warn!("Maximum number of attempts reached. Failed to get information for {}", url);
                        return None;
                    }
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        "Too many requests. Waiting {:.2} seconds before retrying...",
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!("An error occurred while analyzing {}: {}", url, e);
                    return None;
                }
            }
        }
    }

    /// Expand every input URL, keeping input order
    pub async fn collect_all_video_urls(&self, urls: &[String]) -> Vec<String> {
        let mut all_video_urls = Vec::new();
        for url in urls {
            tracing::info!("Analyzing URL: {}", url);
            let video_urls = self.expand(url).await;
            tracing::info!("Videos found: {}", video_urls.len());
            all_video_urls.extend(video_urls);
        }
        all_video_urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::errors::DownloadError;
    use crate::downloader::probe::tests::ScriptedExtractor;
    use serde_json::json;

    const PLAYLIST: &str = "https://www.youtube.com/playlist?list=PL123";

    fn expander(extractor: ScriptedExtractor) -> UrlExpander {
        UrlExpander::new(Box::new(extractor), ExtractorConfig::default())
            .with_retry(RetryPolicy::immediate(3))
    }

    fn playlist_with_gap() -> serde_json::Value {
        json!({
            "_type": "playlist",
            "entries": [
                {"_type": "url", "ie_key": "Youtube", "url": "https://www.youtube.com/watch?v=aaaaaaaaaaa"},
                {"_type": "url", "ie_key": "Youtube", "title": "[Deleted video]"},
                {"_type": "url", "ie_key": "Youtube", "url": "https://www.youtube.com/watch?v=bbbbbbbbbbb"}
            ]
        })
    }

    #[test]
    fn test_classify_shapes() {
        assert_eq!(
            classify(&json!({"_type": "url", "url": "https://www.youtube.com/watch?v=x"})),
            UrlShape::Single("https://www.youtube.com/watch?v=x".to_string())
        );
        assert_eq!(
            classify(&json!({
                "_type": "video",
                "webpage_url": "https://www.youtube.com/watch?v=y",
                "url": "https://cdn.example/stream"
            })),
            UrlShape::Single("https://www.youtube.com/watch?v=y".to_string())
        );
        assert_eq!(
            classify(&json!({"_type": "video", "webpage_url": "https://vimeo.com/1"})),
            UrlShape::Unsupported(Some("video".to_string()))
        );
        assert_eq!(classify(&json!({})), UrlShape::Unsupported(None));
        assert_eq!(
            classify(&json!({"_type": "url", "webpage_url": "", "url": ""})),
            UrlShape::Unsupported(Some("url".to_string()))
        );
        assert_eq!(
            classify(&json!({"_type": "playlist"})),
            UrlShape::Collection(Vec::new())
        );
    }

    #[test]
    fn test_empty_page_url_falls_back_to_url() {
        assert_eq!(
            classify(&json!({
                "_type": "url",
                "webpage_url": "",
                "url": "https://www.youtube.com/watch?v=abcdefghijk"
            })),
            UrlShape::Single("https://www.youtube.com/watch?v=abcdefghijk".to_string())
        );
    }

    #[test]
    fn test_classify_nested_entries() {
        let shape = classify(&json!({
            "_type": "playlist",
            "entries": [
                {"_type": "url", "ie_key": "YoutubeTab", "url": "https://www.youtube.com/@chan/videos"},
                {"_type": "playlist", "url": "https://www.youtube.com/@chan/shorts"},
                {"_type": "url", "url": "https://www.youtube.com/watch?v=ccccccccccc"}
            ]
        }));
        assert_eq!(
            shape,
            UrlShape::Collection(vec![
                Entry::Nested("https://www.youtube.com/@chan/videos".to_string()),
                Entry::Nested("https://www.youtube.com/@chan/shorts".to_string()),
                Entry::Video("https://www.youtube.com/watch?v=ccccccccccc".to_string()),
            ])
        );
    }

    #[tokio::test]
    async fn test_collection_skips_unresolvable_members() {
        let extractor = ScriptedExtractor::default().on_flat(PLAYLIST, vec![Ok(playlist_with_gap())]);
        let urls = expander(extractor).expand(PLAYLIST).await;
        assert_eq!(
            urls,
            vec![
                "https://www.youtube.com/watch?v=aaaaaaaaaaa".to_string(),
                "https://www.youtube.com/watch?v=bbbbbbbbbbb".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_channel_tabs_are_flattened() {
        let channel = "https://www.youtube.com/@chan";
        let videos_tab = "https://www.youtube.com/@chan/videos";
        let extractor = ScriptedExtractor::default()
            .on_flat(
                channel,
                vec![Ok(json!({
                    "_type": "playlist",
                    "entries": [{"_type": "url", "ie_key": "YoutubeTab", "url": videos_tab}]
                }))],
            )
            .on_flat(videos_tab, vec![Ok(playlist_with_gap())]);

        let urls = expander(extractor).expand(channel).await;
        assert_eq!(urls.len(), 2);
        assert!(urls.iter().all(|u| u.contains("watch?v=")));
    }

    #[tokio::test]
    async fn test_self_referencing_nesting_stops() {
        let looping = "https://www.youtube.com/@loop";
        let extractor = ScriptedExtractor::default().on_flat(
            looping,
            vec![Ok(json!({
                "_type": "playlist",
                "entries": [{"_type": "playlist", "url": looping}]
            }))],
        );
        let urls = expander(extractor.clone()).expand(looping).await;
        assert!(urls.is_empty());
        assert_eq!(extractor.call_count(), MAX_NESTING);
    }

    #[tokio::test]
    async fn test_rate_limit_exhaustion_returns_empty() {
        let extractor = ScriptedExtractor::default().on_flat(
            PLAYLIST,
            vec![Err(DownloadError::RateLimited("HTTP Error 429".to_string()))],
        );
        let urls = expander(extractor.clone()).expand(PLAYLIST).await;
        assert!(urls.is_empty());
        assert_eq!(extractor.call_count(), 3);
    }

    #[tokio::test]
    async fn test_rate_limit_then_success() {
        let extractor = ScriptedExtractor::default().on_flat(
            PLAYLIST,
            vec![
                Err(DownloadError::RateLimited("HTTP Error 429".to_string())),
                Ok(playlist_with_gap()),
            ],
        );
        let urls = expander(extractor.clone()).expand(PLAYLIST).await;
        assert_eq!(urls.len(), 2);
        assert_eq!(extractor.call_count(), 2);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let extractor = ScriptedExtractor::default().on_flat(
            PLAYLIST,
            vec![Err(DownloadError::Extraction("ERROR: This playlist does not exist".to_string()))],
        );
        let urls = expander(extractor.clone()).expand(PLAYLIST).await;
        assert!(urls.is_empty());
        assert_eq!(extractor.call_count(), 1);
    }

    #[tokio::test]
    async fn test_collect_keeps_input_order() {
        let single = "https://youtu.be/zzzzzzzzzzz";
        let extractor = ScriptedExtractor::default()
            .on_flat(
                single,
                vec![Ok(json!({"_type": "url", "url": "https://www.youtube.com/watch?v=zzzzzzzzzzz"}))],
            )
            .on_flat(PLAYLIST, vec![Ok(playlist_with_gap())]);

        let inputs = vec![
            PLAYLIST.to_string(),
            "https://example.com/unknown".to_string(),
            single.to_string(),
        ];
        let urls = expander(extractor).collect_all_video_urls(&inputs).await;
        assert_eq!(
            urls,
            vec![
                "https://www.youtube.com/watch?v=aaaaaaaaaaa".to_string(),
                "https://www.youtube.com/watch?v=bbbbbbbbbbb".to_string(),
                "https://www.youtube.com/watch?v=zzzzzzzzzzz".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_playlist_with_429_in_id_is_not_retried() {
        let missing = "https://www.youtube.com/playlist?list=PLx429abc";
        let extractor = ScriptedExtractor::default().on_flat(
            missing,
            vec![Err(DownloadError::from(
                "ERROR: [youtube:tab] PLx429abc: The playlist does not exist.".to_string(),
            ))],
        );
        let urls = expander(extractor.clone()).expand(missing).await;
        assert!(urls.is_empty());
        assert_eq!(extractor.call_count(), 1);
    }
}
