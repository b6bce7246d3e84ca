use std::sync::{Arc, Mutex};

use ytsum::youtube::TranscriptFetcher;
use ytsum::{Segment, Transcript, TranscriptError};

#[derive(Clone, Default)]
pub struct MockFetcher {
    pub segments: Vec<String>,
    /// (video_id, languages) per call
    pub calls: Arc<Mutex<Vec<(String, Vec<String>)>>>,
    pub unavailable: bool,
}

impl MockFetcher {
    pub fn new(segments: &[&str]) -> Self {
        Self {
            segments: segments.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_text(text: String) -> Self {
        Self {
            segments: vec![text],
            ..Default::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }
}

impl TranscriptFetcher for MockFetcher {
    async fn fetch_transcript(&self, video_id: &str, languages: &[String]) -> Result<Transcript, TranscriptError> {
        self.calls
            .lock()
            .unwrap()
            .push((video_id.to_string(), languages.to_vec()));
        if self.unavailable {
            return Err(TranscriptError::LanguageUnavailable {
                video_id: video_id.to_string(),
                requested: languages.to_vec(),
                available: vec!["de".to_string()],
            });
        }
        Ok(Transcript {
            video_id: video_id.to_string(),
            language: languages.first().cloned().unwrap_or_default(),
            segments: self
                .segments
                .iter()
                .enumerate()
                .map(|(i, text)| Segment {
                    text: text.clone(),
                    start: i as f64,
                    duration: 1.0,
                })
                .collect(),
        })
    }
}
