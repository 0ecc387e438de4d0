//! Platform classification and per-platform download profiles
//!
//! [`classify`] maps a URL to a [`Platform`] by case-insensitive substring
//! matching against a fixed, ordered domain table. Each platform resolves to a
//! static [`PlatformProfile`] that carries everything the job runner needs to
//! configure the extractor and to phrase the result.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::types::SupportedPlatforms;

/// The site a URL belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// youtube.com, youtu.be
    YouTube,
    /// instagram.com
    Instagram,
    /// facebook.com, fb.watch
    Facebook,
    /// twitter.com, x.com
    Twitter,
    /// tiktok.com
    TikTok,
    /// pinterest.com
    Pinterest,
    /// linkedin.com
    LinkedIn,
    /// snapchat.com
    Snapchat,
    /// reddit.com
    Reddit,
    /// twitch.tv
    Twitch,
    /// Anything else; handled by the generic profile
    Unknown,
}

/// Domain fragments in match priority order
const DOMAIN_RULES: &[(&str, Platform)] = &[
    ("youtube.com", Platform::YouTube),
    ("youtu.be", Platform::YouTube),
    ("instagram.com", Platform::Instagram),
    ("facebook.com", Platform::Facebook),
    ("fb.watch", Platform::Facebook),
    ("twitter.com", Platform::Twitter),
    ("x.com", Platform::Twitter),
    ("tiktok.com", Platform::TikTok),
    ("pinterest.com", Platform::Pinterest),
    ("linkedin.com", Platform::LinkedIn),
    ("snapchat.com", Platform::Snapchat),
    ("reddit.com", Platform::Reddit),
    ("twitch.tv", Platform::Twitch),
];

/// Classify a URL. Pure and total: anything unrecognized is [`Platform::Unknown`].
pub fn classify(url: &str) -> Platform {
    let lowered = url.to_lowercase();
    DOMAIN_RULES
        .iter()
        .find(|(fragment, _)| lowered.contains(fragment))
        .map(|(_, platform)| *platform)
        .unwrap_or(Platform::Unknown)
}

impl Platform {
    /// Every platform, `Unknown` last
    pub const ALL: [Platform; 11] = [
        Platform::YouTube,
        Platform::Instagram,
        Platform::Facebook,
        Platform::Twitter,
        Platform::TikTok,
        Platform::Pinterest,
        Platform::LinkedIn,
        Platform::Snapchat,
        Platform::Reddit,
        Platform::Twitch,
        Platform::Unknown,
    ];

    /// Lowercase tag, also used as the job folder prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::YouTube => "youtube",
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::Twitter => "twitter",
            Platform::TikTok => "tiktok",
            Platform::Pinterest => "pinterest",
            Platform::LinkedIn => "linkedin",
            Platform::Snapchat => "snapchat",
            Platform::Reddit => "reddit",
            Platform::Twitch => "twitch",
            Platform::Unknown => "unknown",
        }
    }

    /// Download profile for this platform
    pub fn profile(&self) -> &'static PlatformProfile {
        match self {
            Platform::YouTube => &YOUTUBE,
            Platform::Instagram => &INSTAGRAM,
            Platform::TikTok => &TIKTOK,
            Platform::Twitter => &TWITTER,
            Platform::Facebook => &FACEBOOK,
            Platform::Reddit => &REDDIT,
            Platform::Pinterest
            | Platform::LinkedIn
            | Platform::Snapchat
            | Platform::Twitch
            | Platform::Unknown => &GENERIC,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a URL points at, as far as it changes how a download is configured and reported
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// A single item (video, tweet, post on non-Instagram platforms)
    Single,
    /// A YouTube playlist
    Playlist,
    /// Instagram stories of an account
    Stories,
    /// Instagram post (`/p/`)
    Post,
    /// Instagram reel or IGTV video (`/reel/`, `/tv/`)
    Reel,
    /// Instagram profile (recent posts)
    Profile,
}

impl ContentKind {
    /// Derive the content kind from a URL already classified as `platform`
    ///
    /// Unparseable URLs are treated as [`ContentKind::Single`]; the extractor
    /// reports the real problem.
    pub fn detect(platform: Platform, url: &str) -> Self {
        let Ok(parsed) = url::Url::parse(url.trim()) else {
            return ContentKind::Single;
        };
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        match platform {
            Platform::YouTube => {
                let has_list = parsed.query_pairs().any(|(k, _)| k == "list");
                if has_list || segments.first() == Some(&"playlist") {
                    ContentKind::Playlist
                } else {
                    ContentKind::Single
                }
            }
            Platform::Instagram => {
                let marker = segments.iter().find_map(|seg| match *seg {
                    "stories" => Some(ContentKind::Stories),
                    "p" => Some(ContentKind::Post),
                    "reel" | "reels" | "tv" => Some(ContentKind::Reel),
                    _ => None,
                });
                match marker {
                    Some(kind) => kind,
                    None if segments.is_empty() => ContentKind::Single,
                    None => ContentKind::Profile,
                }
            }
            _ => ContentKind::Single,
        }
    }
}

/// Account name embedded in an Instagram URL
///
/// `instagram.com/{user}`, `instagram.com/{user}/p/...` and
/// `instagram.com/stories/{user}/...` all yield `user`.
pub fn instagram_username(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url.trim()).ok()?;
    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());
    match segments.next()? {
        "stories" => segments.next().map(str::to_string),
        "p" | "reel" | "reels" | "tv" => None,
        user => Some(user.to_string()),
    }
}

/// Fixed download configuration and result wording for one platform
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformProfile {
    /// yt-dlp output template, relative to the job folder
    pub output_template: &'static str,
    /// Format selector used when the request has no quality override
    pub default_format: &'static str,
    /// Download uploaded subtitles
    pub write_subtitles: bool,
    /// Download automatically generated subtitles
    pub write_auto_subtitles: bool,
    /// Skip unavailable playlist entries instead of failing the job
    pub ignore_errors: bool,
    /// Chunk size for HTTP downloads, in bytes
    pub http_chunk_size: Option<u64>,
    /// Upper bound of entries fetched for profile URLs
    pub profile_limit: Option<usize>,
    /// Message for a successful single-item download
    pub success_message: &'static str,
    /// Prefix of every failure message
    pub error_prefix: &'static str,
    /// Title reported when the extractor has none
    pub default_title: &'static str,
    /// Result type label for a single item
    pub result_type: &'static str,
    /// Whether results carry the uploader
    pub reports_uploader: bool,
}

const TEN_MIB: u64 = 10 * 1024 * 1024;

static YOUTUBE: PlatformProfile = PlatformProfile {
    output_template: "%(uploader)s - %(title)s.%(ext)s",
    default_format: "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best",
    write_subtitles: true,
    write_auto_subtitles: true,
    ignore_errors: true,
    http_chunk_size: Some(TEN_MIB),
    profile_limit: None,
    success_message: "YouTube content downloaded successfully!",
    error_prefix: "YouTube error: ",
    default_title: "Unknown",
    result_type: "video",
    reports_uploader: true,
};

static INSTAGRAM: PlatformProfile = PlatformProfile {
    output_template: "%(uploader)s_%(id)s_%(upload_date)s.%(ext)s",
    default_format: "best",
    write_subtitles: false,
    write_auto_subtitles: false,
    ignore_errors: false,
    http_chunk_size: None,
    profile_limit: Some(10),
    success_message: "Instagram post downloaded successfully!",
    error_prefix: "Instagram error: ",
    default_title: "Unknown",
    result_type: "post",
    reports_uploader: true,
};

static TIKTOK: PlatformProfile = PlatformProfile {
    output_template: "TikTok_%(uploader)s_%(title)s.%(ext)s",
    default_format: "best",
    write_subtitles: false,
    write_auto_subtitles: false,
    ignore_errors: false,
    http_chunk_size: None,
    profile_limit: None,
    success_message: "TikTok video downloaded successfully!",
    error_prefix: "TikTok error: ",
    default_title: "TikTok Video",
    result_type: "video",
    reports_uploader: true,
};

static TWITTER: PlatformProfile = PlatformProfile {
    output_template: "Twitter_%(uploader)s_%(title)s.%(ext)s",
    default_format: "best",
    write_subtitles: true,
    write_auto_subtitles: false,
    ignore_errors: false,
    http_chunk_size: None,
    profile_limit: None,
    success_message: "Twitter content downloaded successfully!",
    error_prefix: "Twitter error: ",
    default_title: "Twitter Content",
    result_type: "tweet",
    reports_uploader: true,
};

static FACEBOOK: PlatformProfile = PlatformProfile {
    output_template: "Facebook_%(title)s.%(ext)s",
    default_format: "best",
    write_subtitles: false,
    write_auto_subtitles: false,
    ignore_errors: false,
    http_chunk_size: None,
    profile_limit: None,
    success_message: "Facebook content downloaded successfully!",
    error_prefix: "Facebook error: ",
    default_title: "Facebook Content",
    result_type: "video",
    reports_uploader: false,
};

static REDDIT: PlatformProfile = PlatformProfile {
    output_template: "Reddit_%(title)s.%(ext)s",
    default_format: "best",
    write_subtitles: false,
    write_auto_subtitles: false,
    ignore_errors: false,
    http_chunk_size: None,
    profile_limit: None,
    success_message: "Reddit content downloaded successfully!",
    error_prefix: "Reddit error: ",
    default_title: "Reddit Post",
    result_type: "post",
    reports_uploader: false,
};

static GENERIC: PlatformProfile = PlatformProfile {
    output_template: "%(extractor)s_%(title)s.%(ext)s",
    default_format: "best",
    write_subtitles: false,
    write_auto_subtitles: false,
    ignore_errors: false,
    http_chunk_size: None,
    profile_limit: None,
    success_message: "Content downloaded successfully!",
    error_prefix: "Download error: ",
    default_title: "Unknown",
    result_type: "media",
    reports_uploader: false,
};

impl PlatformProfile {
    /// Format selector for a request: the override verbatim, or the platform default
    pub fn format_for<'a>(&'a self, quality: Option<&'a str>) -> &'a str {
        quality.unwrap_or(self.default_format)
    }

    /// Number of entries to fetch for a given content kind
    pub fn entry_limit(&self, kind: ContentKind) -> Option<usize> {
        match kind {
            ContentKind::Profile => self.profile_limit,
            _ => None,
        }
    }

    /// Failure message shown to pollers and bulk callers
    pub fn error_message(&self, cause: impl fmt::Display) -> String {
        format!("{}{}", self.error_prefix, cause)
    }
}

/// Platforms and features advertised to clients
pub fn supported_platforms() -> SupportedPlatforms {
    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    SupportedPlatforms {
        video_platforms: owned(&[
            "YouTube (videos, shorts, playlists)",
            "TikTok",
            "Twitter/X",
            "Facebook",
            "Instagram (Reels, IGTV)",
            "Reddit",
            "Twitch",
            "Vimeo",
            "Dailymotion",
        ]),
        social_platforms: owned(&[
            "Instagram (Posts, Stories, Reels, IGTV)",
            "Twitter/X (Tweets, Threads)",
            "Facebook (Posts, Videos)",
            "Reddit (Posts, Images, Videos)",
            "LinkedIn (Posts)",
            "Pinterest (Pins)",
        ]),
        features: owned(&[
            "Auto-platform detection",
            "Bulk downloads",
            "Stories download",
            "Playlist support",
            "High quality downloads",
            "Metadata preservation",
            "Subtitle downloads",
        ]),
    }
}
