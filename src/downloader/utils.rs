// Helper functions shared by the extractors, muxer and batch drivers

use regex::Regex;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use super::errors::DownloadError;

/// Run `program` to completion with captured output. The child is killed
/// when `timeout_secs` elapses.
pub async fn run_output_with_timeout(
    program: &str,
    args: &[String],
    timeout_secs: u64,
) -> Result<std::process::Output, DownloadError> {
    let child = TokioCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                DownloadError::ToolNotFound(format!("{}: {}", program, e))
            }
            _ => DownloadError::ExecutionError(format!("Failed to start {}: {}", program, e)),
        })?;

    // dropping the wait future on timeout drops the child, which kills it
    timeout(Duration::from_secs(timeout_secs), child.wait_with_output())
        .await
        .map_err(|_| {
            tracing::warn!("{} timed out after {}s", program, timeout_secs);
            DownloadError::NetworkTimeout
        })?
        .map_err(|e| DownloadError::ExecutionError(format!("Failed to wait for {}: {}", program, e)))
}

/// Build an HTTP client, routed through `proxy` when given. Only connecting
/// is bounded here; callers bound reads themselves.
pub fn build_http_client(
    proxy: Option<&str>,
    connect_timeout_secs: u64,
) -> Result<reqwest::Client, DownloadError> {
    let mut builder =
        reqwest::Client::builder().connect_timeout(Duration::from_secs(connect_timeout_secs));

    if let Some(proxy_url) = proxy {
        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| DownloadError::ExecutionError(format!("Invalid proxy URL {}: {}", proxy_url, e)))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| DownloadError::ExecutionError(format!("Failed to build HTTP client: {}", e)))
}

/// Strip characters that are not allowed in file names
pub fn clean_filename(filename: &str) -> String {
    lazy_static::lazy_static! {
        static ref FORBIDDEN_RE: Regex = Regex::new(r#"[\\/*?:"<>|]"#).unwrap();
    }

    FORBIDDEN_RE.replace_all(filename, "").trim().to_string()
}

/// Read a URL list: one URL per line, blank lines ignored
pub fn read_url_list(path: &Path) -> std::io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Write one URL per line, in order
pub fn write_url_list(path: &Path, urls: &[String]) -> std::io::Result<()> {
    let mut content = String::new();
    for url in urls {
        content.push_str(url);
        content.push('\n');
    }
    std::fs::write(path, content)
}
