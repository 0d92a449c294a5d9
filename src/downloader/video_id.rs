// Video identifier extraction from the usual YouTube URL shapes

use regex::Regex;

lazy_static::lazy_static! {
    // Tried in order, first capture wins
    static ref ID_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11}).*").unwrap(),
        Regex::new(r"(?:embed/|v/|youtu\.be/)([0-9A-Za-z_-]{11})").unwrap(),
        Regex::new(r"(?:watch\?v=)([0-9A-Za-z_-]{11})").unwrap(),
    ];
}

/// Extract the 11-character video ID from a watch, short-link or embed URL
pub fn extract_id(url: &str) -> Option<String> {
    ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Canonical page URL probed for a video ID
pub fn watch_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", id)
}
