// yt-dlp InfoExtractor
//
// Runs the native `yt-dlp` binary when it can be found, otherwise
// `python3 -m yt_dlp` (interpreter overridable with YTDLP_PYTHON).

use async_trait::async_trait;
use std::process::{Command as StdCommand, Stdio};
use tokio::sync::OnceCell;

use super::traits::{ExtractorConfig, ExtractorMode, InfoExtractor};
use crate::downloader::errors::DownloadError;
use crate::downloader::models::{StreamCandidate, VideoMetadata};
use crate::downloader::tools::{ToolManager, ToolType};
use crate::downloader::utils::run_output_with_timeout;

/// Program plus leading arguments used to invoke yt-dlp
#[derive(Debug, Clone, PartialEq)]
struct Launcher {
    program: String,
    prefix: Vec<String>,
}

pub struct YtDlpExtractor {
    binary: Option<String>,
    python_cmd: String,
    /// Whether `python_cmd` can import yt_dlp; checked once, on first need
    python_module: OnceCell<bool>,
}

impl YtDlpExtractor {
    pub fn new() -> Self {
        Self::with_tools(ToolManager::new().detect_tool(ToolType::YtDlp), Self::find_python())
    }

    fn with_tools(binary: Option<String>, python_cmd: String) -> Self {
        Self {
            binary,
            python_cmd,
            python_module: OnceCell::new(),
        }
    }

    /// Find Python interpreter
    fn find_python() -> String {
        if let Ok(custom) = std::env::var("YTDLP_PYTHON") {
            return custom;
        }

        let candidates = ["python3", "/opt/homebrew/bin/python3", "/usr/local/bin/python3"];

        for cmd in candidates {
            if let Ok(output) = StdCommand::new(cmd).arg("--version").output() {
                if output.status.success() {
                    return cmd.to_string();
                }
            }
        }

        "python3".to_string()
    }

    /// Check if yt_dlp module is installed
    async fn has_ytdlp_module(&self) -> bool {
        *self
            .python_module
            .get_or_init(|| async {
                let found = tokio::process::Command::new(&self.python_cmd)
                    .args(["-c", "import yt_dlp"])
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .kill_on_drop(true)
                    .status()
                    .await
                    .map_or(false, |status| status.success());
                tracing::debug!("[YtDlp] {} has yt_dlp module: {}", self.python_cmd, found);
                found
            })
            .await
    }

    async fn launcher(&self, mode: ExtractorMode) -> Result<Launcher, DownloadError> {
        let python = || Launcher {
            program: self.python_cmd.clone(),
            prefix: vec!["-m".to_string(), "yt_dlp".to_string()],
        };

        match (mode, &self.binary) {
            (ExtractorMode::Cli | ExtractorMode::Auto, Some(bin)) => Ok(Launcher {
                program: bin.clone(),
                prefix: Vec::new(),
            }),
            (ExtractorMode::Cli, None) => {
                Err(DownloadError::ToolNotFound("yt-dlp binary not found".to_string()))
            }
            (ExtractorMode::Python, _) | (ExtractorMode::Auto, None) => {
                if self.has_ytdlp_module().await {
                    Ok(python())
                } else {
                    Err(DownloadError::ToolNotFound(
                        "Neither yt-dlp binary nor Python yt_dlp module available".to_string(),
                    ))
                }
            }
        }
    }

    /// Common arguments; `mode_args` select full or flat probing
    fn build_args(url: &str, config: &ExtractorConfig, mode_args: &[&str]) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--dump-single-json".to_string(),
            "--no-warnings".to_string(),
            "--quiet".to_string(),
            "--socket-timeout".to_string(),
            config.socket_timeout_seconds.to_string(),
        ];
        args.extend(mode_args.iter().map(|a| a.to_string()));

        if let Some(proxy) = &config.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        args.push(url.to_string());
        args
    }

    async fn run_json(
        &self,
        url: &str,
        config: &ExtractorConfig,
        mode_args: &[&str],
    ) -> Result<serde_json::Value, DownloadError> {
        let launcher = self.launcher(config.mode).await?;
        let mut args = launcher.prefix.clone();
        args.extend(Self::build_args(url, config, mode_args));

        tracing::debug!("[YtDlp] Running: {} {}", launcher.program, args.join(" "));

        let output =
            run_output_with_timeout(&launcher.program, &args, config.process_timeout_seconds).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!("[YtDlp] Failed for {}: {}", url, stderr.trim());
            return Err(DownloadError::from(stderr.to_string()));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| DownloadError::ParseError(format!("Invalid JSON: {}", e)))
    }
}

impl Default for YtDlpExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn a full yt-dlp info dict into typed metadata
pub fn parse_metadata(json: &serde_json::Value) -> Result<VideoMetadata, DownloadError> {
    Ok(VideoMetadata {
        id: json["id"].as_str().unwrap_or("unknown").to_string(),
        title: json["title"].as_str().unwrap_or("Unknown").to_string(),
        webpage_url: json["webpage_url"].as_str().unwrap_or("").to_string(),
        formats: parse_formats(json)?,
    })
}

fn parse_formats(json: &serde_json::Value) -> Result<Vec<StreamCandidate>, DownloadError> {
    let formats_array = match json.get("formats") {
        Some(value) => value
            .as_array()
            .ok_or_else(|| DownloadError::ParseError("formats is not an array".to_string()))?,
        None => return Ok(Vec::new()),
    };

    let formats = formats_array
        .iter()
        // A stream without a URL cannot be fetched or muxed
        .filter_map(|f| {
            let url = f["url"].as_str()?;
            Some(StreamCandidate {
                format_id: f["format_id"].as_str().unwrap_or("").to_string(),
                ext: f["ext"].as_str().unwrap_or("").to_string(),
                vcodec: f["vcodec"].as_str().map(|s| s.to_string()),
                acodec: f["acodec"].as_str().map(|s| s.to_string()),
                height: f["height"].as_u64().map(|h| h as u32),
                fps: f["fps"].as_f64().map(|fps| fps as f32),
                tbr: f["tbr"].as_f64(),
                abr: f["abr"].as_f64(),
                url: url.to_string(),
            })
        })
        .collect();

    Ok(formats)
}

#[async_trait]
impl InfoExtractor for YtDlpExtractor {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<VideoMetadata, DownloadError> {
        let json = self.run_json(url, config, &["--no-playlist"]).await?;
        parse_metadata(&json)
    }

    async fn extract_flat(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<serde_json::Value, DownloadError> {
        self.run_json(url, config, &["--flat-playlist"]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_metadata() {
        let info = json!({
            "id": "dQw4w9WgXcQ",
            "title": "Never Gonna Give You Up",
            "webpage_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "formats": [
                {"format_id": "140", "ext": "m4a", "vcodec": "none", "acodec": "mp4a.40.2",
                 "abr": 129.5, "tbr": 129.5, "url": "https://cdn/140"},
                {"format_id": "137", "ext": "mp4", "vcodec": "avc1.640028", "acodec": "none",
                 "height": 1080, "fps": 25, "tbr": 4400.1, "url": "https://cdn/137"},
                {"format_id": "sb0", "ext": "mhtml", "vcodec": "none", "acodec": "none", "height": 90}
            ]
        });

        let meta = parse_metadata(&info).unwrap();
        assert_eq!(meta.title, "Never Gonna Give You Up");
        assert_eq!(meta.formats.len(), 2);
        assert_eq!(meta.formats[1].height, Some(1080));
        assert_eq!(meta.formats[1].fps, Some(25.0));
        assert_eq!(meta.formats[0].abr, Some(129.5));
        assert!(meta.formats[0].height.is_none());
    }

    #[test]
    fn test_parse_metadata_defaults() {
        let meta = parse_metadata(&json!({})).unwrap();
        assert_eq!(meta.title, "Unknown");
        assert!(meta.formats.is_empty());

        assert!(parse_metadata(&json!({"formats": "nope"})).is_err());
    }

    #[test]
    fn test_build_args() {
        let config = ExtractorConfig::default().with_proxy(Some("socks5://127.0.0.1:9150".to_string()));
        let args = YtDlpExtractor::build_args("https://youtu.be/x", &config, &["--flat-playlist"]);

        assert_eq!(args.first().map(String::as_str), Some("--dump-single-json"));
        assert!(args.windows(2).any(|w| w[0] == "--socket-timeout" && w[1] == "30"));
        assert!(args.windows(2).any(|w| w[0] == "--proxy" && w[1] == "socks5://127.0.0.1:9150"));
        assert!(args.contains(&"--flat-playlist".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("https://youtu.be/x"));
    }

    #[tokio::test]
    async fn test_cli_mode_without_binary() {
        let extractor = YtDlpExtractor::with_tools(None, "python3".to_string());
        assert!(matches!(
            extractor.launcher(ExtractorMode::Cli).await,
            Err(DownloadError::ToolNotFound(_))
        ));

        let extractor = YtDlpExtractor::with_tools(Some("/usr/bin/yt-dlp".to_string()), "python3".to_string());
        assert_eq!(
            extractor.launcher(ExtractorMode::Auto).await.unwrap(),
            Launcher {
                program: "/usr/bin/yt-dlp".to_string(),
                prefix: Vec::new(),
            }
        );
        assert!(!extractor.python_module.initialized());
    }

    #[tokio::test]
    async fn test_module_check_runs_once() {
        let extractor = YtDlpExtractor::with_tools(None, "definitely-not-python-xyz".to_string());
        assert!(matches!(
            extractor.launcher(ExtractorMode::Auto).await,
            Err(DownloadError::ToolNotFound(_))
        ));
        assert_eq!(extractor.python_module.get(), Some(&false));

        let extractor = YtDlpExtractor {
            python_module: OnceCell::new_with(Some(true)),
            ..YtDlpExtractor::with_tools(None, "definitely-not-python-xyz".to_string())
        };
        assert_eq!(
            extractor.launcher(ExtractorMode::Python).await.unwrap(),
            Launcher {
                program: "definitely-not-python-xyz".to_string(),
                prefix: vec!["-m".to_string(), "yt_dlp".to_string()],
            }
        );
    }
}
