// Muxer - combines the selected streams into one output file
//
// Streams are copied, never re-encoded.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;

use super::errors::DownloadError;
use super::tools::{ToolManager, ToolType};

/// Seam to the external muxing capability
#[async_trait]
pub trait Muxer: Send + Sync {
    /// Name of the muxer (for logging)
    fn name(&self) -> &'static str;

    /// Write `output` from a video locator and an optional audio locator.
    /// Without audio the video stream is written as-is.
    async fn mux(
        &self,
        video_url: &str,
        audio_url: Option<&str>,
        output: &Path,
    ) -> Result<(), DownloadError>;
}

pub struct FfmpegMuxer {
    ffmpeg_path: String,
}

impl FfmpegMuxer {
    pub fn new() -> Self {
        Self {
            ffmpeg_path: ToolManager::new().resolve(ToolType::Ffmpeg),
        }
    }

    fn build_args(video_url: &str, audio_url: Option<&str>, output: &Path) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
            "-i".to_string(),
            video_url.to_string(),
        ];

        if let Some(audio) = audio_url {
            args.extend([
                "-i".to_string(),
                audio.to_string(),
                "-map".to_string(),
                "0:v:0".to_string(),
                "-map".to_string(),
                "1:a:0".to_string(),
            ]);
        }

        args.extend([
            "-c".to_string(),
            "copy".to_string(),
            output.to_string_lossy().to_string(),
        ]);
        args
    }
}

impl Default for FfmpegMuxer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Muxer for FfmpegMuxer {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    async fn mux(
        &self,
        video_url: &str,
        audio_url: Option<&str>,
        output: &Path,
    ) -> Result<(), DownloadError> {
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let args = Self::build_args(video_url, audio_url, output);
        tracing::debug!("[Muxer] Running {} with {} input(s)", self.ffmpeg_path, if audio_url.is_some() { 2 } else { 1 });

        let result = tokio::process::Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DownloadError::ToolNotFound(format!("ffmpeg: {}", e))
                } else {
                    DownloadError::MuxingFailure(format!("Failed to run ffmpeg: {}", e))
                }
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(DownloadError::MuxingFailure(format!(
                "ffmpeg exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        if !output.exists() {
            return Err(DownloadError::MuxingFailure(format!(
                "ffmpeg reported success but {} was not written",
                output.display()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_args_with_audio() {
        let args = FfmpegMuxer::build_args(
            "https://cdn/v",
            Some("https://cdn/a"),
            &PathBuf::from("output/Song.mp4"),
        );
        let joined = args.join(" ");
        assert!(joined.contains("-i https://cdn/v -i https://cdn/a -map 0:v:0 -map 1:a:0"));
        assert!(joined.ends_with("-c copy output/Song.mp4"));
    }

    #[test]
    fn test_args_video_only() {
        let args = FfmpegMuxer::build_args("https://cdn/v", None, &PathBuf::from("out.webm"));
        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 1);
        assert!(!args.contains(&"-map".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("out.webm"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_reported() {
        let muxer = FfmpegMuxer {
            ffmpeg_path: "definitely-not-ffmpeg-xyz".to_string(),
        };
        let dir = tempfile::tempdir().unwrap();
        let err = muxer
            .mux("https://cdn/v", None, &dir.path().join("out.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::ToolNotFound(_)));
    }
}
