// Error types for the probe, selection and muxing stages

use thiserror::Error;

use super::extractors::diagnostics::{diagnose_error, BlockingReason};

#[derive(Debug, Error)]
pub enum DownloadError {
    /// URL matched none of the known video identifier patterns
    #[error("Could not extract video ID from URL: {0}")]
    IdentifierNotFound(String),

    /// Probe returned no stream with both a video channel and a height
    #[error("No valid video formats found")]
    NoValidFormats,

    /// Every video stream is above the requested ceiling
    #[error("No video formats found with quality {0}p or lower")]
    NoFormatsUnderQuality(u32),

    /// YouTube answered with HTTP 429 / "too many requests"
    #[error("Rate limited by YouTube: {0}")]
    RateLimited(String),

    /// Network timeout while connecting to YouTube
    #[error("Network timeout: YouTube is not responding")]
    NetworkTimeout,

    /// yt-dlp ran but reported a failure
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// yt-dlp, python or ffmpeg not found in system
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Failed to parse yt-dlp JSON output
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Command could not be spawned or did not finish in time
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// ffmpeg failed or did not produce the output file
    #[error("Muxing failed: {0}")]
    MuxingFailure(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    /// Failures worth another probe attempt
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited(_)
                | Self::NetworkTimeout
                | Self::Extraction(_)
                | Self::ExecutionError(_)
                | Self::ParseError(_)
        )
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    /// Blocking reason behind this error, if it came from YouTube
    pub fn blocking_reason(&self) -> Option<BlockingReason> {
        match self {
            Self::RateLimited(_) => Some(BlockingReason::RateLimited),
            Self::NetworkTimeout => Some(BlockingReason::NetworkTimeout),
            Self::Extraction(msg) => diagnose_error(msg),
            _ => None,
        }
    }
}

// Classify raw yt-dlp stderr
impl From<String> for DownloadError {
    fn from(s: String) -> Self {
        match diagnose_error(&s) {
            Some(BlockingReason::RateLimited) => Self::RateLimited(s.trim().to_string()),
            Some(BlockingReason::NetworkTimeout) => Self::NetworkTimeout,
            _ => Self::Extraction(s.trim().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stderr_classification() {
        let err = DownloadError::from("ERROR: HTTP Error 429: Too Many Requests".to_string());
        assert!(err.is_rate_limited());
        assert!(err.is_transient());

        let err = DownloadError::from("ERROR: Read timed out.".to_string());
        assert!(matches!(err, DownloadError::NetworkTimeout));

        let err = DownloadError::from("ERROR: [youtube] abc: Video unavailable".to_string());
        assert!(matches!(err, DownloadError::Extraction(_)));
        assert!(!err.is_rate_limited());
        assert_eq!(err.blocking_reason(), Some(BlockingReason::VideoUnavailable));
    }

    #[test]
    fn test_id_containing_429_is_not_a_rate_limit() {
        let err = DownloadError::from(
            "ERROR: [youtube:tab] PLx429abc: The playlist does not exist.".to_string(),
        );
        assert!(matches!(err, DownloadError::Extraction(_)));
        assert!(!err.is_rate_limited());
        assert_eq!(err.blocking_reason(), Some(BlockingReason::Unknown));
    }

    #[test]
    fn test_quality_error_names_ceiling() {
        let err = DownloadError::NoFormatsUnderQuality(144);
        assert!(err.to_string().contains("144p"));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_selection_errors_are_not_transient() {
        assert!(!DownloadError::NoValidFormats.is_transient());
        assert!(!DownloadError::IdentifierNotFound("x".into()).is_transient());
        assert!(!DownloadError::ToolNotFound("yt-dlp".into()).is_transient());
    }
}
