use log::{debug, warn};
use serde::Serialize;

use crate::store::{RetentionEntry, RetentionStore};
use crate::summarize::{DEFAULT_INSTRUCTION, Summarizer};
use crate::youtube::TranscriptFetcher;
use crate::{PipelineError, ThumbnailQuality, Transcript, TranscriptError, VideoRef};

/// Stage the pipeline is about to enter, for progress display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchingTranscript,
    Summarizing,
    Saving,
}

impl Stage {
    pub fn message(&self) -> &'static str {
        match self {
            Stage::FetchingTranscript => "Fetching transcript...",
            Stage::Summarizing => "Generating summary...",
            Stage::Saving => "Saving files...",
        }
    }
}

/// Everything one run produced, handed to the presenter
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub video: VideoRef,
    pub thumbnail_url: String,
    pub transcript: Transcript,
    pub summary: String,
    pub saved: Option<RetentionEntry>,
    pub persist_error: Option<String>,
}

impl Report {
    pub fn transcript_text(&self) -> String {
        self.transcript.text()
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub languages: Vec<String>,
    pub instruction: String,
    pub thumbnail: ThumbnailQuality,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            languages: crate::config::DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            instruction: DEFAULT_INSTRUCTION.to_string(),
            thumbnail: ThumbnailQuality::Default,
        }
    }
}

/// URL in, summary out: extract, fetch, summarize, optionally save
pub struct Pipeline<F, S> {
    fetcher: F,
    summarizer: S,
    store: Option<RetentionStore>,
    options: PipelineOptions,
}

impl<F: TranscriptFetcher, S: Summarizer> Pipeline<F, S> {
    pub fn new(fetcher: F, summarizer: S, options: PipelineOptions) -> Self {
        Self {
            fetcher,
            summarizer,
            store: None,
            options,
        }
    }

    pub fn with_store(mut self, store: RetentionStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub async fn run(&self, url: &str) -> Result<Report, PipelineError> {
        self.run_with_progress(url, |_| {}).await
    }

    /// Run one request, calling `on_stage` before each blocking stage
    pub async fn run_with_progress(&self, url: &str, mut on_stage: impl FnMut(Stage)) -> Result<Report, PipelineError> {
        let video = VideoRef::from_url(url).ok_or_else(|| PipelineError::InvalidUrl(url.to_string()))?;
        debug!("Video ID: {video}");

        on_stage(Stage::FetchingTranscript);
        let transcript = self
            .fetcher
            .fetch_transcript(video.id(), &self.options.languages)
            .await?;
        let text = transcript.text();
        debug!(
            "Transcript: lang={} segments={} chars={}",
            transcript.language,
            transcript.segments.len(),
            text.chars().count()
        );
        if text.trim().is_empty() {
            return Err(TranscriptError::EmptyTranscript {
                video_id: video.id().to_string(),
            }
            .into());
        }

        on_stage(Stage::Summarizing);
        let summary = self.summarizer.summarize(&text, &self.options.instruction).await?;

        let (saved, persist_error) = match &self.store {
            Some(store) => {
                on_stage(Stage::Saving);
                match store.persist(&summary, &text) {
                    Ok(entry) => (Some(entry), None),
                    Err(e) => {
                        warn!("Failed to save summary: {e}");
                        (None, Some(PipelineError::from(e).to_string()))
                    }
                }
            }
            None => (None, None),
        };

        Ok(Report {
            thumbnail_url: video.thumbnail_url(self.options.thumbnail),
            video,
            transcript,
            summary,
            saved,
            persist_error,
        })
    }
}
