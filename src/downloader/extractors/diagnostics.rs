// Blocking diagnostics - identifies why YouTube refused a probe
//
// Used to tell a rate limit (worth waiting for) apart from everything else,
// and to print a hint next to a failed item.

/// Why YouTube refused a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockingReason {
    RateLimited,
    Http403Forbidden,
    BotDetection,
    AgeRestricted,
    PrivateVideo,
    VideoUnavailable,
    GeoBlocked,
    /// Often a soft IP block rather than a real network fault
    NetworkTimeout,
    Unknown,
}

/// Lowercase stderr fragments per reason. Checked in order; the first reason
/// with a matching fragment wins, so 429 goes first (its message may also
/// mention bots). Status codes are matched with their "http error" prefix
/// since stderr also carries video and playlist ids.
const SIGNATURES: &[(BlockingReason, &[&str])] = &[
    (
        BlockingReason::RateLimited,
        &["http error 429", "too many requests", "rate limit", "rate-limit"],
    ),
    (
        BlockingReason::AgeRestricted,
        &["age-restricted", "sign in to confirm your age", "age_verification"],
    ),
    (
        BlockingReason::PrivateVideo,
        &["private video", "video is private", "sign in if you've been granted access"],
    ),
    (
        BlockingReason::VideoUnavailable,
        &[
            "video unavailable",
            "video is unavailable",
            "video has been removed",
            "no longer available",
        ],
    ),
    (
        BlockingReason::GeoBlocked,
        &["not available in your country", "blocked in your country", "geographic restriction"],
    ),
    (
        BlockingReason::BotDetection,
        &["confirm you're not a bot", "captcha", "unusual traffic"],
    ),
    (
        BlockingReason::Http403Forbidden,
        &["http error 403", "403 forbidden", "403: forbidden"],
    ),
    (
        BlockingReason::NetworkTimeout,
        &[
            "timed out",
            "timeouterror",
            "read timeout",
            "connect timeout",
            "connection refused",
            "network is unreachable",
            "network unreachable",
        ],
    ),
];

impl BlockingReason {
    /// Nothing on our side (waiting, another IP) will make the video appear
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::VideoUnavailable | Self::PrivateVideo)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::RateLimited => "Rate limited by YouTube",
            Self::Http403Forbidden => "Access denied (HTTP 403)",
            Self::BotDetection => "Bot detection triggered",
            Self::AgeRestricted => "Age-restricted content",
            Self::PrivateVideo => "Private video",
            Self::VideoUnavailable => "Video unavailable",
            Self::GeoBlocked => "Geographic restriction",
            Self::NetworkTimeout => "Network timeout (possible IP throttling)",
            Self::Unknown => "Unrecognized yt-dlp failure",
        }
    }

    /// What the operator can do about it
    pub fn hint(&self) -> &'static str {
        match self {
            Self::RateLimited => "Wait 10-15 minutes or switch to a different IP (VPN/proxy).",
            Self::Http403Forbidden => "Update yt-dlp, or try again through a VPN/proxy.",
            Self::BotDetection => "Use a fresh proxy/VPN and slow down the batch.",
            Self::AgeRestricted => "The video needs a logged-in 18+ account.",
            Self::PrivateVideo => "Only the uploader or invited accounts can access this video.",
            Self::VideoUnavailable => "The video was deleted, made private or removed.",
            Self::GeoBlocked => "Use a VPN/proxy located in an allowed region.",
            Self::NetworkTimeout => "Check your connection or try again later.",
            Self::Unknown => "Check the URL and make sure yt-dlp is up to date.",
        }
    }
}

/// Map yt-dlp stderr to a blocking reason; `None` for an empty message
pub fn diagnose_error(stderr: &str) -> Option<BlockingReason> {
    if stderr.trim().is_empty() {
        return None;
    }

    let lower = stderr.to_lowercase();
    let reason = SIGNATURES
        .iter()
        .find(|(_, fragments)| fragments.iter().any(|f| lower.contains(f)))
        .map_or(BlockingReason::Unknown, |(reason, _)| *reason);
    Some(reason)
}
