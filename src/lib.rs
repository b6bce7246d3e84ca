pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod retry;
pub mod store;
pub mod summarize;
pub mod youtube;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub use error::{PipelineError, StoreError, SummaryError, TranscriptError};

/// A single captioned segment
#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Complete transcript for a video
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub video_id: String,
    pub language: String,
    pub segments: Vec<Segment>,
}

impl Transcript {
    /// All segment texts joined by single spaces, in caption order
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Thumbnail size served by img.youtube.com
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailQuality {
    #[default]
    Default,
    Maxres,
}

impl ThumbnailQuality {
    fn file_name(&self) -> &'static str {
        match self {
            ThumbnailQuality::Default => "0.jpg",
            ThumbnailQuality::Maxres => "maxresdefault.jpg",
        }
    }
}

/// Identifier of a single video
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VideoRef(String);

impl VideoRef {
    /// Parse a pasted watch or share URL
    pub fn from_url(url: &str) -> Option<Self> {
        extract_video_id(url).map(VideoRef)
    }

    pub fn id(&self) -> &str {
        &self.0
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }

    pub fn thumbnail_url(&self, quality: ThumbnailQuality) -> String {
        thumbnail_url(&self.0, quality)
    }
}

impl std::fmt::Display for VideoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

static VIDEO_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://)?(?:www\.)?(?:youtube\.com/watch\?v=|youtu\.be/)([A-Za-z0-9_-]{11})")
        .expect("video URL pattern is valid")
});

/// Extract the 11-character video ID from a watch or youtu.be URL
pub fn extract_video_id(input: &str) -> Option<String> {
    VIDEO_URL_RE.captures(input).map(|caps| caps[1].to_string())
}

/// Thumbnail image URL for a video ID
pub fn thumbnail_url(video_id: &str, quality: ThumbnailQuality) -> String {
    format!("https://img.youtube.com/vi/{video_id}/{}", quality.file_name())
}
