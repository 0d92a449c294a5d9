// InfoExtractor module - video metadata extraction through yt-dlp
//
// `InfoExtractor` is the seam to the external extraction capability:
// a full probe returns typed stream candidates, a flat probe returns the
// raw shape used to classify playlists and channels.

mod traits;
mod ytdlp;
pub mod diagnostics;

pub use traits::{ExtractorConfig, ExtractorMode, InfoExtractor, SOCKET_TIMEOUT_SECS};
pub use ytdlp::{parse_metadata, YtDlpExtractor};
pub use diagnostics::{diagnose_error, BlockingReason};
