// InfoExtractor trait and common types

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

use crate::downloader::errors::DownloadError;
use crate::downloader::models::VideoMetadata;

/// Socket timeout handed to yt-dlp
pub const SOCKET_TIMEOUT_SECS: u32 = 30;

/// How yt-dlp is launched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractorMode {
    /// Python module yt_dlp (`python3 -m yt_dlp`)
    Python,
    /// CLI binary yt-dlp
    Cli,
    /// Binary if present, Python module otherwise
    #[default]
    Auto,
}

impl fmt::Display for ExtractorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Python => write!(f, "python"),
            Self::Cli => write!(f, "cli"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for ExtractorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" => Ok(Self::Python),
            "cli" => Ok(Self::Cli),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown extractor mode '{}'", other)),
        }
    }
}

/// Configuration for info extraction
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Extraction mode (Python, CLI, or Auto)
    pub mode: ExtractorMode,
    /// SOCKS5/HTTP proxy URL
    pub proxy: Option<String>,
    /// Socket timeout passed to yt-dlp
    pub socket_timeout_seconds: u32,
    /// Wall-clock limit for one yt-dlp run
    pub process_timeout_seconds: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            mode: ExtractorMode::Auto,
            proxy: None,
            socket_timeout_seconds: SOCKET_TIMEOUT_SECS,
            process_timeout_seconds: 300,
        }
    }
}

impl ExtractorConfig {
    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_mode(mut self, mode: ExtractorMode) -> Self {
        self.mode = mode;
        self
    }

    /// Defaults, with the launch mode taken from `YTDLP_MODE` when it names one
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var("YTDLP_MODE") {
            match value.parse() {
                Ok(mode) => config.mode = mode,
                Err(e) => tracing::warn!("Ignoring YTDLP_MODE: {}", e),
            }
        }
        config
    }
}

/// Seam to the external metadata extraction capability
#[async_trait]
pub trait InfoExtractor: Send + Sync {
    /// Name of the extractor (for logging)
    fn name(&self) -> &'static str;

    /// Full probe of one video page: every stream descriptor plus title
    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<VideoMetadata, DownloadError>;

    /// Shallow probe that only resolves the shape of `url`
    /// (single video, playlist/channel listing, redirect)
    async fn extract_flat(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<serde_json::Value, DownloadError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("python".parse::<ExtractorMode>(), Ok(ExtractorMode::Python));
        assert_eq!(" CLI ".parse::<ExtractorMode>(), Ok(ExtractorMode::Cli));
        assert_eq!("auto".parse::<ExtractorMode>(), Ok(ExtractorMode::Auto));
        assert!("lux".parse::<ExtractorMode>().is_err());
        assert_eq!(ExtractorMode::Cli.to_string(), "cli");
    }

    #[test]
    fn test_config_builders() {
        let config = ExtractorConfig::default()
            .with_proxy(Some("socks5://127.0.0.1:9150".to_string()))
            .with_mode(ExtractorMode::Python);
        assert_eq!(config.mode, ExtractorMode::Python);
        assert_eq!(config.proxy.as_deref(), Some("socks5://127.0.0.1:9150"));
        assert_eq!(config.socket_timeout_seconds, SOCKET_TIMEOUT_SECS);
        assert_eq!(config.process_timeout_seconds, 300);
    }
}
