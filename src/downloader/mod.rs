// Downloader module - probing, selection, expansion and batch download

pub mod errors;
pub mod expander;
pub mod extractors;
pub mod format_selector;
pub mod models;
pub mod muxer;
pub mod orchestrator;
pub mod probe;
pub mod retry;
pub mod tools;
pub mod utils;
pub mod video_id;

pub use errors::DownloadError;
pub use expander::UrlExpander;
pub use extractors::{ExtractorConfig, InfoExtractor, YtDlpExtractor};
pub use format_selector::FormatSelector;
pub use models::{DownloadOptions, DownloadOutcome, SelectionResult, StreamCandidate, VideoMetadata};
pub use muxer::{FfmpegMuxer, Muxer};
pub use orchestrator::{BatchSummary, Downloader, ResultLog};
pub use probe::MetadataProbe;
pub use retry::RetryPolicy;
pub use speed_test::{SpeedReport, SpeedTest};
