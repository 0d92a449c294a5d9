// Common data models for the downloader

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One stream descriptor from a yt-dlp probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamCandidate {
    /// Format ID (e.g., "137", "140")
    pub format_id: String,
    /// File extension (mp4, webm, m4a)
    pub ext: String,
    /// Video codec (avc1, vp9, av01, none)
    pub vcodec: Option<String>,
    /// Audio codec (mp4a, opus, none)
    pub acodec: Option<String>,
    /// Video height in pixels
    pub height: Option<u32>,
    /// Frames per second
    pub fps: Option<f32>,
    /// Total bitrate in kbps
    pub tbr: Option<f64>,
    /// Audio bitrate in kbps
    pub abr: Option<f64>,
    /// Direct stream URL
    pub url: String,
}

impl StreamCandidate {
    /// Carries a video channel. An absent codec field counts as present,
    /// only the literal "none" marks a missing channel.
    pub fn has_video(&self) -> bool {
        self.vcodec.as_deref() != Some("none")
    }

    /// Carries an audio channel (same rule as `has_video`)
    pub fn has_audio(&self) -> bool {
        self.acodec.as_deref() != Some("none")
    }

    pub fn bitrate(&self) -> f64 {
        self.tbr.unwrap_or(0.0)
    }

    pub fn audio_bitrate(&self) -> f64 {
        self.abr.unwrap_or(0.0)
    }
}

/// Result of one full probe: the format candidate set plus page metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    pub webpage_url: String,
    pub formats: Vec<StreamCandidate>,
}

/// Best video/audio pair chosen for one video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    pub video_url: String,
    /// Set iff `has_separate_audio`
    pub audio_url: Option<String>,
    pub title: String,
    /// e.g. "1080p"
    pub resolution_label: String,
    pub video_extension: String,
    pub audio_extension: Option<String>,
    pub video_has_audio: bool,
    pub has_separate_audio: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadStatus {
    Success,
    Failed,
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// One line of the result log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadOutcome {
    pub video_url: String,
    pub status: DownloadStatus,
    /// Present iff `status` is `Success`
    pub output_path: Option<PathBuf>,
}

impl DownloadOutcome {
    pub fn success(video_url: &str, output_path: PathBuf) -> Self {
        Self {
            video_url: video_url.to_string(),
            status: DownloadStatus::Success,
            output_path: Some(output_path),
        }
    }

    pub fn failed(video_url: &str) -> Self {
        Self {
            video_url: video_url.to_string(),
            status: DownloadStatus::Failed,
            output_path: None,
        }
    }

    /// `<video_url>,<STATUS>,<output_path_or_NA>\n`
    pub fn to_log_line(&self) -> String {
        let path = self
            .output_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "N/A".to_string());
        format!("{},{},{}\n", self.video_url, self.status, path)
    }
}

/// Download options
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub output_dir: PathBuf,
    /// Maximum video height (e.g. 1080)
    pub max_quality: Option<u32>,
    /// Log the full candidate table for every video
    pub debug: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            max_quality: None,
            debug: false,
        }
    }
}

/// Quality ceilings accepted on the command line
pub const QUALITY_LEVELS: [u32; 8] = [144, 240, 360, 480, 720, 1080, 1440, 2160];
