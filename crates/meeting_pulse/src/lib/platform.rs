use std::{fmt, sync::LazyLock};

use regex::Regex;

pub(crate) const VIDEO_EXTENSIONS: [&str; 7] = ["mp4", "webm", "ogg", "ogv", "mov", "m4v", "m3u8"];

const YOUTUBE_DOMAINS: [&str; 3] = ["youtube.com", "youtu.be", "youtube-nocookie.com"];

static YOUTUBE_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:youtube(?:-nocookie)?\.com/(?:watch\?(?:[^#]*&)?v=|embed/|shorts/|live/)|youtu\.be/)([A-Za-z0-9_-]{6,})",
    )
    .unwrap()
});

/// Hosting service of a video url, used to pick a transcript strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoPlatform {
    YouTube,
    Vimeo,
    DirectVideoFile,
    Unknown,
}

impl VideoPlatform {
    /// Substring checks only, in priority order. The video itself is never
    /// inspected.
    pub fn classify(url: &str) -> Self {
        let url = url.trim().to_lowercase();
        if url.is_empty() {
            return VideoPlatform::Unknown;
        }

        if YOUTUBE_DOMAINS.iter().any(|domain| url.contains(domain)) {
            VideoPlatform::YouTube
        } else if url.contains("vimeo.com") {
            VideoPlatform::Vimeo
        } else if has_video_extension(&url) {
            VideoPlatform::DirectVideoFile
        } else {
            VideoPlatform::Unknown
        }
    }

    pub fn is_video(&self) -> bool {
        !matches!(self, VideoPlatform::Unknown)
    }
}

impl fmt::Display for VideoPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VideoPlatform::YouTube => "YouTube",
            VideoPlatform::Vimeo => "Vimeo",
            VideoPlatform::DirectVideoFile => "Direct Video File",
            VideoPlatform::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// True when the url path (query and fragment ignored) ends in a known video
/// file extension.
pub(crate) fn has_video_extension(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    path.rsplit_once('.')
        .map(|(_, ext)| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Extracts the video id from watch, short link, embed and shorts urls.
pub fn youtube_video_id(url: &str) -> Option<String> {
    YOUTUBE_ID_RE
        .captures(url)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}
