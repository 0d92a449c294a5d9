use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Command;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ToolType {
    YtDlp,
    Ffmpeg,
}

impl ToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "yt-dlp",
            ToolType::Ffmpeg => "ffmpeg",
        }
    }

    /// Environment variable that overrides discovery
    fn env_override(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "YTDLP_PATH",
            ToolType::Ffmpeg => "FFMPEG_PATH",
        }
    }

    fn version_arg(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "--version",
            ToolType::Ffmpeg => "-version", // ffmpeg uses a single dash
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub tool_type: ToolType,
    pub version: Option<String>,
    pub path: Option<String>,
    pub is_available: bool,
}

pub struct ToolManager;

impl ToolManager {
    pub fn new() -> Self {
        Self
    }

    pub fn get_tool_info(&self, tool_type: ToolType) -> ToolInfo {
        let path = self.detect_tool(tool_type);
        let version = path.as_deref().and_then(|p| self.get_version(p, tool_type));

        ToolInfo {
            name: tool_type.as_str().to_string(),
            tool_type,
            version,
            is_available: path.is_some(),
            path,
        }
    }

    pub fn get_all_tools(&self) -> Vec<ToolInfo> {
        vec![
            self.get_tool_info(ToolType::YtDlp),
            self.get_tool_info(ToolType::Ffmpeg),
        ]
    }

    /// Path to run the tool with; falls back to the bare name so PATH lookup
    /// happens at spawn time.
    pub fn resolve(&self, tool_type: ToolType) -> String {
        self.detect_tool(tool_type)
            .unwrap_or_else(|| tool_type.as_str().to_string())
    }

    pub fn detect_tool(&self, tool_type: ToolType) -> Option<String> {
        if let Ok(custom) = std::env::var(tool_type.env_override()) {
            if !custom.trim().is_empty() {
                return Some(custom);
            }
        }

        let binary_name = tool_type.as_str();

        // 1. Try common paths first
        let mut common_paths = vec![
            PathBuf::from(format!("/opt/homebrew/bin/{}", binary_name)),
            PathBuf::from(format!("/usr/local/bin/{}", binary_name)),
            PathBuf::from(format!("/usr/bin/{}", binary_name)),
        ];
        // pip --user installs land here
        if let Some(home) = dirs::home_dir() {
            common_paths.push(home.join(".local/bin").join(binary_name));
        }

        for path in common_paths {
            if path.exists() {
                return Some(path.to_string_lossy().to_string());
            }
        }

        // 2. Try PATH
        if let Ok(output) = Command::new("which").arg(binary_name).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    return Some(path);
                }
            }
        }

        None
    }

    fn get_version(&self, path: &str, tool_type: ToolType) -> Option<String> {
        match Command::new(path).arg(tool_type.version_arg()).output() {
            Ok(output) if output.status.success() => {
                let out = String::from_utf8_lossy(&output.stdout);
                // ffmpeg prints a banner, keep the first line only
                out.lines().next().map(|l| l.trim().to_string())
            }
            _ => None,
        }
    }
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Log detected tools (used in --debug runs)
pub fn log_tools_status() {
    for tool in ToolManager::new().get_all_tools() {
        match (&tool.path, &tool.version) {
            (Some(path), Some(version)) => {
                tracing::debug!("[Tools] {} {} at {}", tool.name, version, path)
            }
            (Some(path), None) => tracing::debug!("[Tools] {} at {} (version unknown)", tool.name, path),
            _ => tracing::warn!("[Tools] {} not found", tool.name),
        }
    }
}
