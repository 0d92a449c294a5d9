// FormatSelector - best video/audio pair under an optional height ceiling
//
// Video: highest (height, tbr). Audio: highest (abr, tbr) among every stream
// with an audio channel, audio-only streams included. Missing bitrates count
// as 0. On exact ties the first candidate in probe order wins.

use std::cmp::Ordering;

use super::errors::DownloadError;
use super::models::{SelectionResult, StreamCandidate, VideoMetadata};

/// Format selector over one probe's candidate set
pub struct FormatSelector;

impl FormatSelector {
    /// Pick the best video stream and the best audio stream
    pub fn select_best(
        metadata: &VideoMetadata,
        max_quality: Option<u32>,
    ) -> Result<SelectionResult, DownloadError> {
        let formats = &metadata.formats;

        let mut video_formats: Vec<&StreamCandidate> = formats
            .iter()
            .filter(|f| f.has_video() && f.height.is_some())
            .collect();
        if video_formats.is_empty() {
            return Err(DownloadError::NoValidFormats);
        }

        if let Some(max) = max_quality {
            video_formats.retain(|f| f.height.map_or(false, |h| h <= max));
            if video_formats.is_empty() {
                return Err(DownloadError::NoFormatsUnderQuality(max));
            }
        }

        let best_video = first_max_by(video_formats.iter().copied(), |a, b| {
            a.height
                .cmp(&b.height)
                .then_with(|| a.bitrate().total_cmp(&b.bitrate()))
        })
        .ok_or(DownloadError::NoValidFormats)?;

        let best_audio = first_max_by(formats.iter().filter(|f| f.has_audio()), |a, b| {
            a.audio_bitrate()
                .total_cmp(&b.audio_bitrate())
                .then_with(|| a.bitrate().total_cmp(&b.bitrate()))
        });

        Ok(SelectionResult {
            video_url: best_video.url.clone(),
            audio_url: best_audio.map(|a| a.url.clone()),
            title: metadata.title.clone(),
            resolution_label: format!("{}p", best_video.height.unwrap_or(0)),
            video_extension: best_video.ext.clone(),
            audio_extension: best_audio.map(|a| a.ext.clone()),
            video_has_audio: best_video.has_audio(),
            has_separate_audio: best_audio.is_some(),
        })
    }

    /// Container for the muxed file. Muxing copies streams, so the video's
    /// own extension is kept unless the audio stream cannot live in it.
    pub fn output_extension(selection: &SelectionResult) -> String {
        let video_ext = selection.video_extension.as_str();
        let Some(audio_ext) = selection.audio_extension.as_deref() else {
            return video_ext.to_string();
        };

        let compatible = match video_ext {
            "mp4" => matches!(audio_ext, "m4a" | "mp4" | "mp3"),
            "webm" => matches!(audio_ext, "webm" | "weba" | "opus" | "ogg"),
            "mkv" => true,
            _ => audio_ext == video_ext,
        };

        if compatible {
            video_ext.to_string()
        } else {
            "mkv".to_string()
        }
    }

    /// One line per video candidate, for --debug listings
    pub fn describe_candidates(metadata: &VideoMetadata) -> Vec<String> {
        metadata
            .formats
            .iter()
            .filter(|f| f.has_video() && f.height.is_some())
            .enumerate()
            .map(|(i, f)| {
                format!(
                    "{}. Resolution: {}p, Codec: {}, FPS: {}, Bitrate: {}k, Audio Codec: {}",
                    i + 1,
                    f.height.unwrap_or(0),
                    f.vcodec.as_deref().unwrap_or("?"),
                    f.fps.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string()),
                    f.tbr.map(|v| format!("{:.0}", v)).unwrap_or_else(|| "?".to_string()),
                    f.acodec.as_deref().unwrap_or("?"),
                )
            })
            .collect()
    }
}

/// Maximum by `cmp`, keeping the earliest element among equals
/// (`Iterator::max_by` keeps the last one)
fn first_max_by<'a, I, F>(iter: I, mut cmp: F) -> Option<&'a StreamCandidate>
where
    I: Iterator<Item = &'a StreamCandidate>,
    F: FnMut(&StreamCandidate, &StreamCandidate) -> Ordering,
{
    iter.fold(None, |best, candidate| match best {
        Some(current) if cmp(candidate, current) != Ordering::Greater => Some(current),
        _ => Some(candidate),
    })
}
