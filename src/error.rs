use std::path::PathBuf;

use thiserror::Error;

/// Failure to obtain a transcript from the transcript service
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not extract InnerTube API key from watch page")]
    MissingApiKey,

    #[error("no captions available for video {video_id}")]
    NoCaptions { video_id: String },

    #[error("no transcript in {requested:?} for video {video_id} (available: {available:?})")]
    LanguageUnavailable {
        video_id: String,
        requested: Vec<String>,
        available: Vec<String>,
    },

    #[error("caption track for video {video_id} contains no text")]
    EmptyTranscript { video_id: String },

    #[error("error parsing caption XML: {0}")]
    Parse(String),
}

/// Failure to generate a summary from the completion endpoint
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("{env_var} environment variable not set (required for {provider} summarization)")]
    MissingApiKey { provider: String, env_var: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API returned {status}: {body}")]
    Api { provider: String, status: u16, body: String },

    #[error("unexpected {0} API response format")]
    UnexpectedResponse(String),
}

impl SummaryError {
    /// Whether a retry has a chance of succeeding
    pub fn is_transient(&self) -> bool {
        match self {
            SummaryError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            SummaryError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Failure to write or prune the retention directory
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| StoreError::Io { action, path, source }
    }
}

/// Where a pipeline run stopped
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not extract video ID from: {0}")]
    InvalidUrl(String),

    #[error("transcript unavailable: {0}")]
    TranscriptUnavailable(#[from] TranscriptError),

    #[error("summary generation failed: {0}")]
    GenerationFailed(#[from] SummaryError),

    #[error("saving summary failed: {0}")]
    PersistenceFailed(#[from] StoreError),
}

impl PipelineError {
    /// Message shown to the person who pasted the URL
    pub fn user_message(&self, languages: &[String]) -> String {
        match self {
            PipelineError::InvalidUrl(_) => "Please provide a valid YouTube link.".to_string(),
            PipelineError::TranscriptUnavailable(_) => format!(
                "Video summarization is currently supported for {} only. \
                 Please provide a video URL with content in one of these languages.",
                languages.join(", ")
            ),
            PipelineError::GenerationFailed(e) => format!("Error generating summary: {e}"),
            PipelineError::PersistenceFailed(e) => format!("Error saving files: {e}"),
        }
    }
}
